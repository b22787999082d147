// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::backends::event_host::InMemoryEventHost;
    use crate::backends::page::StaticPage;
    use crate::backends::stub::{PassThroughDefineSlots, RecordingRequestAds};
    use crate::config::consts::AB_TEST_KEY;
    use crate::config::{
        AdSlot, AfterRequestAdsState, EventTrigger, LoadingKind, RefreshOptions, RuntimeConfig,
        SlotLoading, SpaConfig, StaticConfig, TargetingValue, TriggerSource, ValidateLocation,
    };
    use crate::engine::PipelineConfiguration;
    use crate::errors::TagError;
    use crate::tag::logger::testing::RecordingLogger;
    use crate::tag::{RefreshOutcome, StateKind, Tag};
    use crate::traits::EventScope;

    struct Harness {
        tag: Tag,
        page: Arc<StaticPage>,
        host: Arc<InMemoryEventHost>,
        request_ads: Arc<RecordingRequestAds>,
    }

    fn harness_with(request_ads: RecordingRequestAds) -> Harness {
        let page = Arc::new(StaticPage::new("https://www.example.com/news"));
        let host = Arc::new(InMemoryEventHost::new());
        let request_ads = Arc::new(request_ads);
        let tag = Tag::new(
            PipelineConfiguration::new(
                Arc::new(PassThroughDefineSlots::new()),
                request_ads.clone(),
            ),
            page.clone(),
            host.clone(),
        );
        Harness {
            tag,
            page,
            host,
            request_ads,
        }
    }

    fn harness() -> Harness {
        harness_with(RecordingRequestAds::new())
    }

    fn slot(dom_id: &str, behaviour: SlotLoading) -> AdSlot {
        AdSlot {
            dom_id: dom_id.into(),
            ad_unit_path: format!("/1234/{}", dom_id),
            sizes: vec![],
            bucket: None,
            label_all: vec![],
            label_any: vec![],
            behaviour,
        }
    }

    fn window_scroll() -> EventTrigger {
        EventTrigger {
            event: "scroll".into(),
            source: TriggerSource::Window,
        }
    }

    fn config(slots: Vec<AdSlot>) -> StaticConfig {
        StaticConfig {
            slots,
            ..StaticConfig::default()
        }
    }

    fn spa_config(slots: Vec<AdSlot>, keep_targeting: bool) -> StaticConfig {
        StaticConfig {
            slots,
            spa: SpaConfig {
                enabled: true,
                validate_location: ValidateLocation::Href,
                keep_targeting,
            },
            ..StaticConfig::default()
        }
    }

    fn recorded_states(tag: &Tag) -> Arc<Mutex<Vec<AfterRequestAdsState>>> {
        let states = Arc::new(Mutex::new(Vec::new()));
        let captured = states.clone();
        tag.after_request_ads(Arc::new(move |state: AfterRequestAdsState| -> anyhow::Result<()> {
            captured.lock().unwrap().push(state);
            Ok(())
        }));
        states
    }

    /// Let spawned cycles and trigger refreshes run to completion.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fn requested(harness: &Harness) -> Vec<Vec<String>> {
        harness.request_ads.requests()
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_second_configure_is_a_no_op() {
        let h = harness();
        let first = h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;
        assert_eq!(first, StateKind::Configured);

        let second = h
            .tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot("side", SlotLoading::Eager),
            ]))
            .await;

        assert_eq!(second, StateKind::Configured);
        assert_eq!(h.tag.get_config().unwrap().slots.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_config_keeps_tag_configurable() {
        let h = harness();
        let state = h
            .tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot("top", SlotLoading::Manual),
            ]))
            .await;

        assert_eq!(state, StateKind::Configurable);
        assert!(h.tag.get_config().is_none());
    }

    /// requestAds before configure is remembered and runs once configured
    #[tokio::test]
    async fn test_request_ads_before_configure_is_deferred() {
        let h = harness();
        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::Configurable);
        assert!(requested(&h).is_empty());

        let state = h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;

        assert_eq!(state, StateKind::Finished);
        assert_eq!(requested(&h), vec![ids(&["top"])]);
    }

    #[tokio::test]
    async fn test_config_flag_starts_cycle_on_configure() {
        let h = harness();
        let mut static_config = config(vec![slot("top", SlotLoading::Eager)]);
        static_config.request_ads = true;

        assert_eq!(h.tag.configure(static_config).await, StateKind::Finished);
        assert_eq!(requested(&h).len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_finishes_and_notifies_hooks() {
        let h = harness();
        h.tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot("side", SlotLoading::Manual),
            ]))
            .await;
        let states = recorded_states(&h.tag);
        let seen_ab_test = Arc::new(AtomicUsize::new(0));
        let captured = seen_ab_test.clone();
        h.tag.before_request_ads(Arc::new(
            move |_: &StaticConfig, runtime: &RuntimeConfig| -> anyhow::Result<()> {
                if runtime.key_values.contains_key(AB_TEST_KEY) {
                    captured.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            },
        ));

        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::Finished);

        assert_eq!(requested(&h), vec![ids(&["top"])]);
        assert_eq!(*states.lock().unwrap(), vec![AfterRequestAdsState::Finished]);
        assert_eq!(seen_ab_test.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.request_ads.key_values()[0].get("domain"),
            Some(&TargetingValue::from("example.com"))
        );
    }

    #[tokio::test]
    async fn test_failed_cycle_ends_in_error_and_rejects_refresh() {
        let h = harness_with(RecordingRequestAds::new().failing("ad server down"));
        h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;
        let states = recorded_states(&h.tag);

        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::Error);
        assert_eq!(*states.lock().unwrap(), vec![AfterRequestAdsState::Error]);

        let refresh = h.tag.refresh_ad_slot(&["top"], RefreshOptions::default()).await;
        assert!(matches!(
            refresh,
            Err(TagError::InvalidState {
                operation: "refreshAdSlot",
                state: StateKind::Error
            })
        ));
    }

    /// Refreshes queued before configure ride along with the first cycle in one request
    #[tokio::test]
    async fn test_queued_refresh_is_batched_into_first_cycle() {
        let h = harness();
        let outcome = h
            .tag
            .refresh_ad_slot(&["side"], RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Queued);

        h.tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot("side", SlotLoading::Manual),
            ]))
            .await;
        h.tag.request_ads().await.unwrap();

        assert_eq!(requested(&h), vec![ids(&["top", "side"])]);
    }

    #[tokio::test]
    async fn test_refresh_after_finish_runs_immediately() {
        let h = harness();
        let mut bottom = slot("bottom", SlotLoading::Manual);
        bottom.bucket = Some("below-the-fold".into());
        h.tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot("side", SlotLoading::Manual),
                bottom,
            ]))
            .await;
        h.tag.request_ads().await.unwrap();

        let outcome = h
            .tag
            .refresh_ad_slot(&["side", "missing"], RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Refreshed);
        h.tag
            .refresh_bucket("below-the-fold", RefreshOptions::default())
            .await
            .unwrap();

        assert_eq!(
            requested(&h),
            vec![ids(&["top"]), ids(&["side"]), ids(&["bottom"])]
        );
    }

    #[tokio::test]
    async fn test_infinite_refresh_needs_a_configured_template() {
        let h = harness();
        h.tag
            .configure(config(vec![slot(
                "feed",
                SlotLoading::Infinite {
                    selector: ".feed-item".into(),
                },
            )]))
            .await;
        h.tag.request_ads().await.unwrap();

        let unknown = h.tag.refresh_infinite_ad_slot("feed-2", "nope").await;
        assert!(matches!(unknown, Err(TagError::UnknownSlot(ref id)) if id == "nope"));

        h.tag.refresh_infinite_ad_slot("feed-2", "feed").await.unwrap();
        assert_eq!(requested(&h), vec![ids(&["feed-2"])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lazy_slot_loads_once_on_trigger() {
        let h = harness();
        h.tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot(
                    "lazy",
                    SlotLoading::Lazy {
                        trigger: window_scroll(),
                    },
                ),
            ]))
            .await;
        h.tag.request_ads().await.unwrap();
        assert_eq!(requested(&h), vec![ids(&["top"])]);

        h.host.dispatch(&EventScope::Window, "scroll");
        settle().await;
        h.host.dispatch(&EventScope::Window, "scroll");
        settle().await;

        assert_eq!(requested(&h), vec![ids(&["top"]), ids(&["lazy"])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshable_slot_respects_trigger_throttle() {
        let h = harness();
        h.tag
            .configure(config(vec![slot(
                "sticky",
                SlotLoading::Refreshable {
                    trigger: window_scroll(),
                    throttle: Some(30),
                },
            )]))
            .await;
        h.tag.request_ads().await.unwrap();

        h.host.dispatch(&EventScope::Window, "scroll");
        settle().await;
        h.host.dispatch(&EventScope::Window, "scroll");
        settle().await;
        assert_eq!(requested(&h).len(), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        h.host.dispatch(&EventScope::Window, "scroll");
        settle().await;
        assert_eq!(requested(&h).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_throttle_limits_manual_refreshes() {
        let h = harness();
        let mut static_config = config(vec![slot("side", SlotLoading::Manual)]);
        static_config.throttle = Some(10);
        h.tag.configure(static_config).await;
        h.tag.request_ads().await.unwrap();

        h.tag.refresh_ad_slot(&["side"], RefreshOptions::default()).await.unwrap();
        h.tag.refresh_ad_slot(&["side"], RefreshOptions::default()).await.unwrap();
        assert_eq!(requested(&h), vec![ids(&["side"])]);

        tokio::time::advance(Duration::from_secs(11)).await;
        h.tag.refresh_ad_slot(&["side"], RefreshOptions::default()).await.unwrap();
        assert_eq!(requested(&h).len(), 2);
    }

    /// Without a navigation a second SPA requestAds is rejected
    #[tokio::test(start_paused = true)]
    async fn test_spa_request_ads_requires_navigation() {
        let h = harness();
        let logger = Arc::new(RecordingLogger::default());
        h.tag.set_logger(logger.clone());
        h.tag
            .configure(spa_config(vec![slot("top", SlotLoading::Eager)], false))
            .await;

        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::SpaRequestAds);
        settle().await;
        assert_eq!(h.tag.get_state(), StateKind::SpaFinished);

        let second = h.tag.request_ads().await;
        assert!(matches!(second, Err(TagError::LocationUnchanged { .. })));
        assert_eq!(requested(&h).len(), 1);
        assert!(logger.lines().iter().any(|(level, line)| {
            *level == "warn" && line.contains("https://www.example.com/news")
        }));

        h.page.navigate("https://www.example.com/sport");
        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::SpaRequestAds);
        settle().await;
        assert_eq!(requested(&h).len(), 2);
    }

    /// Calls made while a cycle runs land on the next cycle's config
    #[tokio::test(start_paused = true)]
    async fn test_spa_targeting_during_cycle_goes_to_next_cycle() {
        let h = harness_with(RecordingRequestAds::new().with_delay(Duration::from_millis(100)));
        h.tag
            .configure(spa_config(vec![slot("top", SlotLoading::Eager)], false))
            .await;
        let states = recorded_states(&h.tag);

        h.tag.request_ads().await.unwrap();
        h.tag.set_targeting("section", "news");
        settle().await;
        assert_eq!(h.tag.get_state(), StateKind::SpaRequestAds);
        assert!(!h.request_ads.key_values()[0].contains_key("section"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(h.tag.get_state(), StateKind::SpaFinished);
        assert_eq!(
            h.tag.get_runtime_config().key_values.get("section"),
            Some(&TargetingValue::from("news"))
        );
        assert_eq!(*states.lock().unwrap(), vec![AfterRequestAdsState::SpaFinished]);

        h.page.navigate("https://www.example.com/sport");
        h.tag.request_ads().await.unwrap();
        settle().await;
        assert!(h.request_ads.key_values()[1].contains_key("section"));
        assert!(!h.tag.get_runtime_config().key_values.contains_key("section"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spa_keep_targeting_carries_key_values() {
        let h = harness_with(RecordingRequestAds::new().with_delay(Duration::from_millis(50)));
        h.tag
            .configure(spa_config(vec![slot("top", SlotLoading::Eager)], true))
            .await;
        h.tag.set_targeting("section", "news");

        h.tag.request_ads().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            h.tag.get_runtime_config().key_values.get("section"),
            Some(&TargetingValue::from("news"))
        );
    }

    /// A cycle overtaken by a navigation never settles the tag
    #[tokio::test(start_paused = true)]
    async fn test_stale_spa_cycle_is_discarded() {
        let h = harness_with(RecordingRequestAds::new().with_delay(Duration::from_millis(100)));
        h.tag
            .configure(spa_config(vec![slot("top", SlotLoading::Eager)], false))
            .await;
        let states = recorded_states(&h.tag);

        h.tag.request_ads().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.page.navigate("https://www.example.com/sport");
        h.tag.request_ads().await.unwrap();

        tokio::time::sleep(Duration::from_millis(90)).await;
        assert_eq!(h.tag.get_state(), StateKind::SpaRequestAds);
        assert!(states.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.tag.get_state(), StateKind::SpaFinished);
        assert_eq!(*states.lock().unwrap(), vec![AfterRequestAdsState::SpaFinished]);
        assert_eq!(requested(&h).len(), 2);
    }

    /// Refreshes queued during an SPA cycle are flushed when it settles
    #[tokio::test(start_paused = true)]
    async fn test_spa_refresh_queued_during_cycle_is_flushed() {
        let h = harness_with(RecordingRequestAds::new().with_delay(Duration::from_millis(50)));
        h.tag
            .configure(spa_config(
                vec![slot("top", SlotLoading::Eager), slot("side", SlotLoading::Manual)],
                false,
            ))
            .await;
        h.tag.request_ads().await.unwrap();

        let outcome = h
            .tag
            .refresh_ad_slot(&["side"], RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Queued);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(requested(&h), vec![ids(&["top"]), ids(&["side"])]);

        let outcome = h
            .tag
            .refresh_ad_slot(&["side"], RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Refreshed);

        h.page.navigate("https://www.example.com/sport");
        let outcome = h
            .tag
            .refresh_ad_slot(&["side"], RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Queued);
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_block_others() {
        let h = harness();
        let logger = Arc::new(RecordingLogger::default());
        h.tag.set_logger(logger.clone());
        h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;

        h.tag.after_request_ads(Arc::new(|_: AfterRequestAdsState| -> anyhow::Result<()> {
            anyhow::bail!("publisher callback threw")
        }));
        let states = recorded_states(&h.tag);
        h.tag.request_ads().await.unwrap();

        assert_eq!(*states.lock().unwrap(), vec![AfterRequestAdsState::Finished]);
        assert!(logger
            .lines()
            .iter()
            .any(|(level, line)| *level == "warn" && line.contains("publisher callback threw")));
    }

    #[tokio::test]
    async fn test_removed_listener_is_not_called() {
        let h = harness();
        h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let captured = calls.clone();
        let id = h.tag.after_request_ads(Arc::new(
            move |_: AfterRequestAdsState| -> anyhow::Result<()> {
                captured.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ));

        assert!(h.tag.remove_event_listener(id));
        h.tag.request_ads().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_labels_and_refresh_kind_filter_slots() {
        let h = harness();
        let mut mobile = slot("mobile-top", SlotLoading::Eager);
        mobile.label_all = vec!["mobile".into()];
        h.tag
            .configure(config(vec![slot("top", SlotLoading::Eager), mobile]))
            .await;
        h.tag.add_label("desktop");
        h.tag.request_ads().await.unwrap();

        h.tag
            .refresh_ad_slot(
                &["top"],
                RefreshOptions {
                    loaded: LoadingKind::Manual,
                },
            )
            .await
            .unwrap();

        assert_eq!(requested(&h), vec![ids(&["top"])]);
    }

    /// Targeting set by a beforeRequestAds hook is part of the cycle that fired it
    #[tokio::test]
    async fn test_before_hook_targeting_reaches_same_cycle() {
        let h = harness();
        h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;
        let tag = h.tag.clone();
        h.tag.before_request_ads(Arc::new(
            move |_: &StaticConfig, _: &RuntimeConfig| -> anyhow::Result<()> {
                tag.set_targeting("from_hook", "yes");
                tag.add_label("hooked");
                Ok(())
            },
        ));

        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::Finished);

        assert_eq!(
            h.request_ads.key_values()[0].get("from_hook"),
            Some(&TargetingValue::from("yes"))
        );
        assert!(h.tag.get_runtime_config().labels.contains(&"hooked".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_before_hook_targeting_reaches_same_spa_cycle() {
        let h = harness();
        h.tag
            .configure(spa_config(vec![slot("top", SlotLoading::Eager)], false))
            .await;
        let tag = h.tag.clone();
        h.tag.before_request_ads(Arc::new(
            move |_: &StaticConfig, _: &RuntimeConfig| -> anyhow::Result<()> {
                tag.set_targeting("from_hook", "yes");
                Ok(())
            },
        ));

        h.tag.request_ads().await.unwrap();
        settle().await;

        assert!(h.request_ads.key_values()[0].contains_key("from_hook"));
        assert!(!h.tag.get_runtime_config().key_values.contains_key("from_hook"));
    }

    #[tokio::test]
    async fn test_failing_before_hook_does_not_block_others() {
        let h = harness();
        let logger = Arc::new(RecordingLogger::default());
        h.tag.set_logger(logger.clone());
        h.tag.configure(config(vec![slot("top", SlotLoading::Eager)])).await;
        h.tag.before_request_ads(Arc::new(
            |_: &StaticConfig, _: &RuntimeConfig| -> anyhow::Result<()> {
                anyhow::bail!("consent not ready")
            },
        ));
        let calls = Arc::new(AtomicUsize::new(0));
        let captured = calls.clone();
        h.tag.before_request_ads(Arc::new(
            move |_: &StaticConfig, _: &RuntimeConfig| -> anyhow::Result<()> {
                captured.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ));

        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::Finished);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(requested(&h), vec![ids(&["top"])]);
        assert!(logger.lines().iter().any(|(level, line)| {
            *level == "warn"
                && line.contains("beforeRequestAds")
                && line.contains("consent not ready")
        }));
    }

    /// A failed SPA cycle still settles; refreshes queued meanwhile wait for the next cycle
    #[tokio::test(start_paused = true)]
    async fn test_failed_spa_cycle_keeps_queued_refreshes() {
        let h = harness_with(
            RecordingRequestAds::new()
                .with_delay(Duration::from_millis(50))
                .failing("ad server down"),
        );
        h.tag
            .configure(spa_config(
                vec![slot("top", SlotLoading::Eager), slot("side", SlotLoading::Manual)],
                false,
            ))
            .await;
        let states = recorded_states(&h.tag);

        h.tag.request_ads().await.unwrap();
        let outcome = h
            .tag
            .refresh_ad_slot(&["side"], RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, RefreshOutcome::Queued);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.tag.get_state(), StateKind::SpaFinished);
        assert_eq!(*states.lock().unwrap(), vec![AfterRequestAdsState::SpaFinished]);
        assert_eq!(requested(&h), vec![ids(&["top"])]);
        assert_eq!(h.tag.get_runtime_config().refresh_slots.len(), 1);

        h.page.navigate("https://www.example.com/sport");
        h.tag.request_ads().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(requested(&h), vec![ids(&["top"]), ids(&["top", "side"])]);
    }

    /// Refreshes after an SPA cycle use that cycle's labels and targeting defaults
    #[tokio::test(start_paused = true)]
    async fn test_spa_finished_refresh_uses_cycle_config() {
        let h = harness();
        let mut desktop_side = slot("side", SlotLoading::Manual);
        desktop_side.label_all = vec!["desktop".into()];
        h.tag
            .configure(spa_config(
                vec![slot("top", SlotLoading::Eager), desktop_side],
                false,
            ))
            .await;
        h.tag.add_label("desktop");

        h.tag.request_ads().await.unwrap();
        settle().await;
        assert_eq!(h.tag.get_state(), StateKind::SpaFinished);

        let outcome = h
            .tag
            .refresh_ad_slot(&["side"], RefreshOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(requested(&h), vec![ids(&["top"]), ids(&["side"])]);
        let refresh_key_values = &h.request_ads.key_values()[1];
        assert!(refresh_key_values.contains_key(AB_TEST_KEY));
        assert!(refresh_key_values.contains_key("domain"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_in_error_state_is_logged_with_slot() {
        let h = harness_with(RecordingRequestAds::new().failing("ad server down"));
        let logger = Arc::new(RecordingLogger::default());
        h.tag.set_logger(logger.clone());
        h.tag
            .configure(config(vec![
                slot("top", SlotLoading::Eager),
                slot(
                    "lazy",
                    SlotLoading::Lazy {
                        trigger: window_scroll(),
                    },
                ),
            ]))
            .await;
        assert_eq!(h.tag.request_ads().await.unwrap(), StateKind::Error);

        h.host.dispatch(&EventScope::Window, "scroll");
        settle().await;

        assert_eq!(requested(&h), vec![ids(&["top"])]);
        assert!(logger.lines().iter().any(|(level, line)| {
            *level == "warn" && line.contains("'lazy'") && line.contains("did not refresh")
        }));
    }
}
