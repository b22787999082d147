// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::config::{EventTrigger, LoadingKind, RefreshOptions, SlotLoading, StaticConfig};
use crate::events::EventCallback;
use crate::observability::messages::tag::{TriggerBindingFailed, TriggerRefreshRejected};
use crate::tag::Tag;
use crate::traits::NativeEvent;

/// Hook lazy and refreshable slots up to their triggers.
///
/// A lazy slot loads once, on the first event; a refreshable slot refreshes
/// on every event that passes its throttle window.
pub(crate) fn bind_slot_triggers(tag: &Tag, config: &StaticConfig) {
    for slot in &config.slots {
        match &slot.behaviour {
            SlotLoading::Lazy { trigger } => {
                bind(tag, &slot.dom_id, trigger, None, LoadingKind::Lazy, false)
            }
            SlotLoading::Refreshable { trigger, throttle } => bind(
                tag,
                &slot.dom_id,
                trigger,
                throttle.map(Duration::from_secs),
                LoadingKind::Refreshable,
                true,
            ),
            SlotLoading::Eager | SlotLoading::Manual | SlotLoading::Infinite { .. } => {}
        }
    }
}

fn bind(
    tag: &Tag,
    dom_id: &str,
    trigger: &EventTrigger,
    throttle: Option<Duration>,
    loaded: LoadingKind,
    permanent: bool,
) {
    let source = match tag.event_sources().get_or_create_event_source(trigger, throttle) {
        Ok(source) => source,
        Err(error) => {
            tag.emit(&TriggerBindingFailed {
                dom_id,
                error: &error,
            });
            return;
        }
    };

    let weak = tag.downgrade();
    let dom_id = dom_id.to_string();
    let callback: EventCallback = Arc::new(move |_: &NativeEvent| {
        let (Some(tag), Ok(handle)) = (Tag::upgrade(&weak), Handle::try_current()) else {
            return;
        };
        let dom_id = dom_id.clone();
        handle.spawn(async move {
            if let Err(error) = tag
                .refresh_ad_slot(&[dom_id.as_str()], RefreshOptions { loaded })
                .await
            {
                tag.emit(&TriggerRefreshRejected {
                    dom_id: &dom_id,
                    error: &error,
                });
            }
        });
    });
    source.add_callback(callback, permanent);
}
