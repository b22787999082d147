// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use rand::Rng;

use crate::config::consts::{AB_TEST_KEY, AB_TEST_MAX, AB_TEST_MIN, DOMAIN_KEY};
use crate::config::{
    validate_static_config, AdSlot, AfterRequestAdsHook, AfterRequestAdsState, BeforeRequestAdsHook,
    HookId, InfiniteSlotRequest, RefreshBucketRequest, RefreshOptions, RefreshSlotRequest,
    RuntimeConfig, StaticConfig, TargetingValue, ValidateLocation,
};
use crate::engine::{AdPipeline, PipelineConfiguration};
use crate::errors::{PipelineError, TagError};
use crate::events::{EventSourceRegistry, RenderEndedEvents, ThrottleGuard};
use crate::observability::messages::tag::{
    ConfigurationRejected, CycleStarted, HookFailed, InvalidConfiguration, LocationUnchanged,
    ModuleSkipped, RefreshExecuted, RefreshFailed, RefreshQueued, SlotsThrottled,
    StaleCycleDiscarded, StateTransition, UnknownSlotsSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::tag::location::domain_of;
use crate::tag::logger::{forward, TagLogger};
use crate::tag::slots::{
    infinite_clone, select_bucket_slots, select_cycle_slots, select_queued_slots,
    select_refresh_slots, SlotSelection,
};
use crate::tag::state::TagState;
use crate::tag::transitions::{
    accepts_mutations, configure_allowed, refresh_disposition, register_module_allowed,
    request_ads_decision, settled_state, spa_settlement, RefreshDisposition, RequestAdsDecision,
    SpaSettlement,
};
use crate::tag::triggers::bind_slot_triggers;
use crate::tag::StateKind;
use crate::traits::{EventHost, PageEnvironment, TagModule};
use crate::utils::sync::lock;

/// Result of a refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Stored and executed with a later cycle
    Queued,
    Refreshed,
}

/// A listener for [`Tag::add_event_listener`].
#[derive(Clone)]
pub enum TagEventListener {
    BeforeRequestAds(BeforeRequestAdsHook),
    AfterRequestAds(AfterRequestAdsHook),
}

enum RefreshRequest {
    Slots {
        dom_ids: Vec<String>,
        options: RefreshOptions,
    },
    InfiniteSlot {
        dom_id: String,
        id_of_configured_slot: String,
    },
    Bucket {
        bucket: String,
        options: RefreshOptions,
    },
}

impl RefreshRequest {
    fn operation(&self) -> &'static str {
        match self {
            RefreshRequest::Slots { .. } => "refreshAdSlot",
            RefreshRequest::InfiniteSlot { .. } => "refreshInfiniteAdSlot",
            RefreshRequest::Bucket { .. } => "refreshBucket",
        }
    }

    fn target(&self) -> String {
        match self {
            RefreshRequest::Slots { dom_ids, .. } => dom_ids.join(", "),
            RefreshRequest::InfiniteSlot { dom_id, .. } => dom_id.clone(),
            RefreshRequest::Bucket { bucket, .. } => bucket.clone(),
        }
    }

    fn enqueue(self, runtime: &mut RuntimeConfig) {
        match self {
            RefreshRequest::Slots { dom_ids, options } => runtime.refresh_slots.extend(
                dom_ids
                    .into_iter()
                    .map(|dom_id| RefreshSlotRequest { dom_id, options }),
            ),
            RefreshRequest::InfiniteSlot {
                dom_id,
                id_of_configured_slot,
            } => runtime.refresh_infinite_slots.push(InfiniteSlotRequest {
                dom_id,
                id_of_configured_slot,
            }),
            RefreshRequest::Bucket { bucket, options } => {
                runtime.refresh_buckets.push(RefreshBucketRequest { bucket, options })
            }
        }
    }

    fn select(&self, config: &StaticConfig) -> SlotSelection {
        match self {
            RefreshRequest::Slots { dom_ids, options } => {
                select_refresh_slots(config, dom_ids, options.loaded)
            }
            RefreshRequest::InfiniteSlot {
                dom_id,
                id_of_configured_slot,
            } => SlotSelection {
                slots: infinite_clone(config, dom_id, id_of_configured_slot)
                    .into_iter()
                    .collect(),
                unknown: Vec::new(),
            },
            RefreshRequest::Bucket { bucket, options } => SlotSelection {
                slots: select_bucket_slots(config, bucket, options.loaded),
                unknown: Vec::new(),
            },
        }
    }
}

/// Pending config handed to the before hooks.
struct PendingCycle {
    config: Arc<StaticConfig>,
    runtime: RuntimeConfig,
    hooks: Vec<(HookId, BeforeRequestAdsHook)>,
}

/// A cycle prepared under the state lock, run after it is released.
struct PreparedCycle {
    config: Arc<StaticConfig>,
    runtime: Arc<RuntimeConfig>,
    selection: SlotSelection,
    request_ads_calls: u64,
    from: StateKind,
    to: StateKind,
    spa: Option<(u64, String)>,
}

pub(crate) struct TagInner {
    state: Mutex<TagState>,
    core_steps: PipelineConfiguration,
    modules: Mutex<Vec<Arc<dyn TagModule>>>,
    pipeline: Mutex<Option<Arc<AdPipeline>>>,
    throttle: Mutex<Option<Arc<ThrottleGuard>>>,
    registry: EventSourceRegistry,
    render_events: Arc<RenderEndedEvents>,
    page: Arc<dyn PageEnvironment>,
    logger: Mutex<Option<Arc<dyn TagLogger>>>,
    request_ads_calls: AtomicU64,
    spa_cycle: AtomicU64,
}

/// The publisher-facing ad tag.
///
/// `Tag` is a cheap handle; clones share one state machine. Every operation
/// is legal in every state: calls that make no sense in the current state
/// are logged and ignored, and only location validation and refreshes in
/// the `error` state surface as `Err`.
///
/// # State machine
/// ```text
/// configurable --configure--> configured --requestAds--> requestAds --> finished | error
///                                        \
///                                         +--requestAds (spa)--> spa-requestAds <--> spa-finished
/// ```
///
/// In SPA mode, calls made while a cycle is in flight land on a "next"
/// runtime config and never on the one the pipeline consumes.
#[derive(Clone)]
pub struct Tag {
    inner: Arc<TagInner>,
}

impl Tag {
    /// Create a tag around the core integration steps.
    pub fn new(
        core_steps: PipelineConfiguration,
        page: Arc<dyn PageEnvironment>,
        host: Arc<dyn EventHost>,
    ) -> Self {
        Self {
            inner: Arc::new(TagInner {
                state: Mutex::new(TagState::initial()),
                core_steps,
                modules: Mutex::new(Vec::new()),
                pipeline: Mutex::new(None),
                throttle: Mutex::new(None),
                registry: EventSourceRegistry::new(host),
                render_events: Arc::new(RenderEndedEvents::new()),
                page,
                logger: Mutex::new(None),
                request_ads_calls: AtomicU64::new(0),
                spa_cycle: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<TagInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<TagInner>) -> Option<Tag> {
        inner.upgrade().map(|inner| Tag { inner })
    }

    pub fn get_state(&self) -> StateKind {
        lock(&self.inner.state).kind()
    }

    /// The static config, once `configure()` accepted one.
    pub fn get_config(&self) -> Option<Arc<StaticConfig>> {
        lock(&self.inner.state).config().cloned()
    }

    /// Snapshot of the runtime config publisher calls currently land on.
    pub fn get_runtime_config(&self) -> RuntimeConfig {
        lock(&self.inner.state).visible_runtime()
    }

    pub fn render_events(&self) -> Arc<RenderEndedEvents> {
        self.inner.render_events.clone()
    }

    pub fn event_sources(&self) -> &EventSourceRegistry {
        &self.inner.registry
    }

    pub fn set_logger(&self, logger: Arc<dyn TagLogger>) {
        *lock(&self.inner.logger) = Some(logger);
    }

    pub fn set_targeting(&self, key: &str, value: impl Into<TargetingValue>) {
        let value = value.into();
        self.mutate("setTargeting", |runtime| runtime.set_targeting(key, value));
    }

    pub fn add_label(&self, label: &str) {
        self.mutate("addLabel", |runtime| runtime.add_label(label));
    }

    /// Replace the ad unit path variables of the current runtime config.
    pub fn set_ad_unit_path_variables(&self, variables: HashMap<String, String>) {
        self.mutate("setAdUnitPathVariables", |runtime| {
            runtime.ad_unit_path_variables = variables
        });
    }

    pub fn before_request_ads(&self, hook: BeforeRequestAdsHook) -> HookId {
        self.add_event_listener(TagEventListener::BeforeRequestAds(hook))
    }

    pub fn after_request_ads(&self, hook: AfterRequestAdsHook) -> HookId {
        self.add_event_listener(TagEventListener::AfterRequestAds(hook))
    }

    /// Register a listener. Listeners are carried into every later cycle.
    pub fn add_event_listener(&self, listener: TagEventListener) -> HookId {
        let id = HookId::next();
        let mut state = lock(&self.inner.state);
        let hooks = state.hooks_mut();
        match listener {
            TagEventListener::BeforeRequestAds(hook) => hooks.before_request_ads.push((id, hook)),
            TagEventListener::AfterRequestAds(hook) => hooks.after_request_ads.push((id, hook)),
        }
        id
    }

    pub fn remove_event_listener(&self, id: HookId) -> bool {
        lock(&self.inner.state).hooks_mut().remove(id)
    }

    /// Add a module whose steps are merged into the pipeline on `configure()`.
    pub fn register_module(&self, module: Arc<dyn TagModule>) {
        let state = self.get_state();
        if !register_module_allowed(state) {
            self.emit(&ConfigurationRejected {
                operation: "registerModule",
                state,
            });
            return;
        }
        lock(&self.inner.modules).push(module);
    }

    /// Accept the static configuration and build the pipeline.
    ///
    /// Continues straight into a `requestAds()` cycle when one was requested
    /// before, or when the config asks for it. An invalid config or a second
    /// call leaves the state unchanged.
    pub async fn configure(&self, config: StaticConfig) -> StateKind {
        let state = self.get_state();
        if !configure_allowed(state) {
            self.emit(&ConfigurationRejected {
                operation: "configure",
                state,
            });
            return state;
        }
        if let Err(error) = validate_static_config(&config) {
            self.emit(&InvalidConfiguration { error: &error });
            return state;
        }

        let config = Arc::new(config);
        let pipeline = Arc::new(self.build_pipeline(&config));
        let start_now = {
            let mut state = lock(&self.inner.state);
            match std::mem::replace(&mut *state, TagState::initial()) {
                TagState::Configurable {
                    runtime,
                    initialize,
                } => {
                    *state = TagState::Configured {
                        config: config.clone(),
                        runtime,
                    };
                    initialize || config.request_ads
                }
                other => {
                    let kind = other.kind();
                    *state = other;
                    drop(state);
                    self.emit(&ConfigurationRejected {
                        operation: "configure",
                        state: kind,
                    });
                    return kind;
                }
            }
        };
        *lock(&self.inner.pipeline) = Some(pipeline);
        *lock(&self.inner.throttle) = config
            .throttle
            .map(|seconds| Arc::new(ThrottleGuard::new(Duration::from_secs(seconds))));
        self.emit(&StateTransition {
            from: StateKind::Configurable,
            to: StateKind::Configured,
        });

        if start_now {
            self.start_cycle().await
        } else {
            StateKind::Configured
        }
    }

    /// Start a request cycle.
    ///
    /// Before `configure()` this only remembers the call. In SPA mode the
    /// cycle runs in the background and the call returns `spa-requestAds`;
    /// otherwise the cycle is awaited and the terminal state returned.
    pub async fn request_ads(&self) -> Result<StateKind, TagError> {
        let (state, decision, href) = {
            let mut state = lock(&self.inner.state);
            let kind = state.kind();
            let href = self.inner.page.href();
            let location_changed = match &*state {
                TagState::SpaRequestAds { config, href: last, .. }
                | TagState::SpaFinished { config, href: last, .. } => {
                    let strategy = config.spa.validate_location;
                    strategy == ValidateLocation::None
                        || !strategy.is_same_page(last, &href)
                }
                _ => true,
            };
            let decision = request_ads_decision(kind, location_changed);
            if let (RequestAdsDecision::MarkInitialize, TagState::Configurable { initialize, .. }) =
                (decision, &mut *state)
            {
                *initialize = true;
            }
            (kind, decision, href)
        };

        match decision {
            RequestAdsDecision::MarkInitialize => Ok(state),
            RequestAdsDecision::StartCycle => Ok(self.start_cycle().await),
            RequestAdsDecision::RejectUnchangedLocation => {
                self.emit(&LocationUnchanged { href: &href });
                Err(TagError::LocationUnchanged { href })
            }
            RequestAdsDecision::Ignore => {
                self.emit(&ConfigurationRejected {
                    operation: "requestAds",
                    state,
                });
                Ok(state)
            }
        }
    }

    /// Refresh slots by dom id.
    ///
    /// Only slots whose loading behaviour matches `options.loaded` are refreshed.
    pub async fn refresh_ad_slot(
        &self,
        dom_ids: &[&str],
        options: RefreshOptions,
    ) -> Result<RefreshOutcome, TagError> {
        self.refresh(RefreshRequest::Slots {
            dom_ids: dom_ids.iter().map(|id| id.to_string()).collect(),
            options,
        })
        .await
    }

    /// Request a clone of the configured infinite slot under a new dom id.
    pub async fn refresh_infinite_ad_slot(
        &self,
        dom_id: &str,
        id_of_configured_slot: &str,
    ) -> Result<RefreshOutcome, TagError> {
        if let Some(config) = self.get_config() {
            if infinite_clone(&config, dom_id, id_of_configured_slot).is_none() {
                return Err(TagError::UnknownSlot(id_of_configured_slot.to_string()));
            }
        }
        self.refresh(RefreshRequest::InfiniteSlot {
            dom_id: dom_id.to_string(),
            id_of_configured_slot: id_of_configured_slot.to_string(),
        })
        .await
    }

    pub async fn refresh_bucket(
        &self,
        bucket: &str,
        options: RefreshOptions,
    ) -> Result<RefreshOutcome, TagError> {
        self.refresh(RefreshRequest::Bucket {
            bucket: bucket.to_string(),
            options,
        })
        .await
    }

    async fn refresh(&self, request: RefreshRequest) -> Result<RefreshOutcome, TagError> {
        let operation = request.operation();
        let (state, execution) = {
            let mut state = lock(&self.inner.state);
            let kind = state.kind();
            let same_page = match &*state {
                TagState::SpaFinished { config, href, .. } => config
                    .spa
                    .validate_location
                    .is_same_page(href, &self.inner.page.href()),
                _ => true,
            };

            match refresh_disposition(kind, same_page) {
                RefreshDisposition::Queue => match state.pending_runtime_mut() {
                    Some(runtime) => {
                        let target = request.target();
                        request.enqueue(runtime);
                        drop(state);
                        self.emit(&RefreshQueued {
                            operation,
                            target: &target,
                            state: kind,
                        });
                        return Ok(RefreshOutcome::Queued);
                    }
                    None => (kind, None),
                },
                RefreshDisposition::Execute => {
                    let execution = match &*state {
                        TagState::SpaFinished {
                            config,
                            cycle_runtime,
                            ..
                        } => Some((config.clone(), cycle_runtime.clone())),
                        TagState::RequestAds { config, runtime }
                        | TagState::Finished { config, runtime } => {
                            Some((config.clone(), runtime.clone()))
                        }
                        _ => None,
                    };
                    (kind, execution)
                }
                RefreshDisposition::Reject => (kind, None),
            }
        };

        let Some((config, runtime)) = execution else {
            self.emit(&ConfigurationRejected { operation, state });
            return Err(TagError::InvalidState { operation, state });
        };
        let selection = request.select(&config);
        self.execute_refresh(config, runtime, selection).await;
        Ok(RefreshOutcome::Refreshed)
    }

    /// Run the selected slots through the pipeline as one request, minus throttled ones.
    async fn execute_refresh(
        &self,
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
        selection: SlotSelection,
    ) {
        if !selection.unknown.is_empty() {
            self.emit(&UnknownSlotsSkipped {
                dom_ids: &selection.unknown,
            });
        }

        let guard = lock(&self.inner.throttle).clone();
        let (slots, throttled): (Vec<AdSlot>, Vec<AdSlot>) = match guard {
            Some(guard) => selection
                .slots
                .into_iter()
                .partition(|slot| guard.try_acquire(&slot.dom_id)),
            None => (selection.slots, Vec::new()),
        };
        if !throttled.is_empty() {
            let dom_ids: Vec<String> = throttled.into_iter().map(|slot| slot.dom_id).collect();
            self.emit(&SlotsThrottled { dom_ids: &dom_ids });
        }
        if slots.is_empty() {
            return;
        }

        let dom_ids: Vec<String> = slots.iter().map(|slot| slot.dom_id.clone()).collect();
        match self.run_pipeline(slots, config, runtime).await {
            Ok(()) => self.emit(&RefreshExecuted { dom_ids: &dom_ids }),
            Err(error) => self.emit(&RefreshFailed { error: &error }),
        }
    }

    async fn run_pipeline(
        &self,
        slots: Vec<AdSlot>,
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
    ) -> Result<(), PipelineError> {
        let pipeline = lock(&self.inner.pipeline)
            .clone()
            .ok_or_else(|| PipelineError::InternalError {
                message: "pipeline used before configure".to_string(),
            })?;
        let request_ads_calls = self.inner.request_ads_calls.load(Ordering::SeqCst);
        pipeline
            .run(slots, config, runtime, request_ads_calls)
            .await
    }

    /// Run the before hooks, then freeze the pending runtime config and run a cycle on it.
    ///
    /// Hooks see the pending config with the targeting defaults applied.
    /// Calls they make on the tag land on that config and so reach this cycle.
    async fn start_cycle(&self) -> StateKind {
        let Some(PendingCycle {
            config,
            runtime,
            hooks,
        }) = self.pending_cycle()
        else {
            return self.get_state();
        };
        for (_, hook) in &hooks {
            if let Err(error) = hook(&config, &runtime) {
                self.emit(&HookFailed {
                    hook: "beforeRequestAds",
                    error: &error,
                });
            }
        }

        let Some(PreparedCycle {
            config,
            runtime,
            selection,
            request_ads_calls,
            from,
            to,
            spa,
        }) = self.prepare_cycle()
        else {
            return self.get_state();
        };

        self.emit(&StateTransition { from, to });
        if !selection.unknown.is_empty() {
            self.emit(&UnknownSlotsSkipped {
                dom_ids: &selection.unknown,
            });
        }
        self.emit(&CycleStarted {
            request_ads_calls,
            slot_count: selection.slots.len(),
            spa: spa.is_some(),
        });

        if spa.is_some() {
            self.inner.registry.remove_all_event_sources();
        }
        bind_slot_triggers(self, &config);

        match spa {
            Some((spa_cycle, href)) => {
                let tag = self.clone();
                tokio::spawn(async move {
                    let succeeded = tag
                        .run_pipeline(selection.slots, config, runtime)
                        .await
                        .is_ok();
                    tag.settle_spa_cycle(spa_cycle, href, succeeded).await;
                });
                StateKind::SpaRequestAds
            }
            None => {
                let succeeded = self
                    .run_pipeline(selection.slots, config, runtime)
                    .await
                    .is_ok();
                self.settle_cycle(succeeded)
            }
        }
    }

    fn pending_cycle(&self) -> Option<PendingCycle> {
        let href = self.inner.page.href();
        let mut state = lock(&self.inner.state);
        let config = state.config()?.clone();
        let runtime = match &mut *state {
            TagState::Configured { runtime, .. } | TagState::SpaFinished { runtime, .. } => runtime,
            TagState::SpaRequestAds { next, .. } => next,
            _ => return None,
        };
        apply_targeting_defaults(&config, runtime, &href);
        Some(PendingCycle {
            hooks: runtime.hooks.before_request_ads.clone(),
            runtime: runtime.clone(),
            config,
        })
    }

    fn prepare_cycle(&self) -> Option<PreparedCycle> {
        let href = self.inner.page.href();
        let mut state = lock(&self.inner.state);
        let from = state.kind();
        let (config, mut runtime) = match std::mem::replace(&mut *state, TagState::initial()) {
            TagState::Configured { config, runtime } => (config, runtime),
            TagState::SpaRequestAds { config, next, .. } => (config, next),
            TagState::SpaFinished { config, runtime, .. } => (config, runtime),
            other => {
                *state = other;
                return None;
            }
        };

        let queues = runtime.take_refresh_queues();
        let selection = select_cycle_slots(&config, &queues);
        let runtime = Arc::new(runtime);
        let request_ads_calls = self.inner.request_ads_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let spa = if config.spa.enabled {
            let spa_cycle = self.inner.spa_cycle.fetch_add(1, Ordering::SeqCst) + 1;
            *state = TagState::SpaRequestAds {
                config: config.clone(),
                runtime: runtime.clone(),
                next: runtime.carry_forward(config.spa.keep_targeting),
                href: href.clone(),
                cycle: spa_cycle,
            };
            Some((spa_cycle, href))
        } else {
            *state = TagState::RequestAds {
                config: config.clone(),
                runtime: runtime.clone(),
            };
            None
        };

        Some(PreparedCycle {
            to: state.kind(),
            config,
            runtime,
            selection,
            request_ads_calls,
            from,
            spa,
        })
    }

    /// Settle a non-SPA cycle into `finished` or `error`.
    fn settle_cycle(&self, succeeded: bool) -> StateKind {
        let (to, after) = settled_state(false, succeeded);
        let hooks = {
            let mut state = lock(&self.inner.state);
            match std::mem::replace(&mut *state, TagState::initial()) {
                TagState::RequestAds { config, runtime } => {
                    let hooks = runtime.hooks.after_request_ads.clone();
                    *state = if succeeded {
                        TagState::Finished { config, runtime }
                    } else {
                        TagState::Error { config, runtime }
                    };
                    hooks
                }
                other => {
                    let kind = other.kind();
                    *state = other;
                    return kind;
                }
            }
        };

        self.emit(&StateTransition {
            from: StateKind::RequestAds,
            to,
        });
        self.fire_after_hooks(&hooks, after);
        to
    }

    /// Apply a settled SPA cycle unless a later cycle or a navigation superseded it.
    ///
    /// Refreshes queued while the cycle ran are flushed only when it succeeded;
    /// otherwise they stay queued for the next cycle.
    async fn settle_spa_cycle(&self, spa_cycle: u64, href: String, succeeded: bool) {
        let (to, after) = settled_state(true, succeeded);
        let current_href = self.inner.page.href();
        let settled = {
            let mut state = lock(&self.inner.state);
            let same_page = state.config().map_or(false, |config| {
                config
                    .spa
                    .validate_location
                    .is_same_page(&href, &current_href)
            });
            let active_cycle = state.active_spa_cycle().unwrap_or_default();
            match spa_settlement(state.kind(), active_cycle, spa_cycle, same_page) {
                SpaSettlement::DiscardStale => None,
                SpaSettlement::Apply => match std::mem::replace(&mut *state, TagState::initial()) {
                    TagState::SpaRequestAds {
                        config,
                        runtime,
                        mut next,
                        href: cycle_href,
                        ..
                    } => {
                        let queues = if succeeded {
                            next.take_refresh_queues()
                        } else {
                            Default::default()
                        };
                        let hooks = next.hooks.after_request_ads.clone();
                        *state = TagState::SpaFinished {
                            config: config.clone(),
                            runtime: next,
                            cycle_runtime: runtime.clone(),
                            href: cycle_href,
                        };
                        Some((config, runtime, queues, hooks))
                    }
                    other => {
                        *state = other;
                        None
                    }
                },
            }
        };

        let Some((config, runtime, queues, hooks)) = settled else {
            self.emit(&StaleCycleDiscarded { cycle: spa_cycle });
            return;
        };

        self.emit(&StateTransition {
            from: StateKind::SpaRequestAds,
            to,
        });
        if !queues.is_empty() {
            let selection = select_queued_slots(&config, &queues);
            self.execute_refresh(config, runtime, selection).await;
        }
        self.fire_after_hooks(&hooks, after);
    }

    fn fire_after_hooks(
        &self,
        hooks: &[(HookId, AfterRequestAdsHook)],
        state: AfterRequestAdsState,
    ) {
        for (_, hook) in hooks {
            if let Err(error) = hook(state) {
                self.emit(&HookFailed {
                    hook: "afterRequestAds",
                    error: &error,
                });
            }
        }
    }

    fn build_pipeline(&self, config: &StaticConfig) -> AdPipeline {
        let mut steps = self.inner.core_steps.clone();
        let modules = lock(&self.inner.modules).clone();
        for module in modules {
            match module.pipeline_steps(config) {
                Ok(contribution) => steps.merge(contribution),
                Err(error) => self.emit(&ModuleSkipped {
                    module: module.name(),
                    error: &error,
                }),
            }
        }
        AdPipeline::new(steps, self.inner.render_events.clone())
    }

    fn mutate(&self, operation: &'static str, apply: impl FnOnce(&mut RuntimeConfig)) {
        let rejected = {
            let mut state = lock(&self.inner.state);
            let kind = state.kind();
            match state.pending_runtime_mut() {
                Some(runtime) if accepts_mutations(kind) => {
                    apply(runtime);
                    None
                }
                _ => Some(kind),
            }
        };
        if let Some(state) = rejected {
            self.emit(&ConfigurationRejected { operation, state });
        }
    }

    /// Log through `tracing` and the installed logger, if any.
    pub(crate) fn emit(&self, message: &dyn StructuredLog) {
        message.log();
        let logger = lock(&self.inner.logger).clone();
        if let Some(logger) = logger {
            forward(logger.as_ref(), message);
        }
    }
}

/// A/B bucket and domain key-values for the coming cycle.
///
/// A bucket set by the publisher is kept; the domain is skipped when
/// neither the config nor the page provides one.
fn apply_targeting_defaults(config: &StaticConfig, runtime: &mut RuntimeConfig, href: &str) {
    let ab_test_set = runtime.key_values.contains_key(AB_TEST_KEY)
        || config.targeting.key_values.contains_key(AB_TEST_KEY);
    if !ab_test_set {
        let bucket = rand::thread_rng().gen_range(AB_TEST_MIN..=AB_TEST_MAX);
        runtime.set_targeting(AB_TEST_KEY, bucket.to_string());
    }

    if let Some(domain) = config.domain.clone().or_else(|| domain_of(href)) {
        runtime.set_targeting(DOMAIN_KEY, domain);
    }
}
