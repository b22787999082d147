// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::config::{AdSlot, LoadingKind, RefreshQueues, SlotLoading, StaticConfig};

/// Slots chosen for one pipeline run plus the ids that matched nothing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SlotSelection {
    pub slots: Vec<AdSlot>,
    pub unknown: Vec<String>,
}

impl SlotSelection {
    fn push(&mut self, seen: &mut HashSet<String>, slot: AdSlot) {
        if seen.insert(slot.dom_id.clone()) {
            self.slots.push(slot);
        }
    }
}

/// Slots requested when a `requestAds()` cycle starts.
///
/// Eager and refreshable slots, followed by everything the queued refresh
/// requests select.
pub fn select_cycle_slots(config: &StaticConfig, queues: &RefreshQueues) -> SlotSelection {
    let mut selection = SlotSelection::default();
    let mut seen = HashSet::new();
    for slot in &config.slots {
        if matches!(slot.loading_kind(), LoadingKind::Eager | LoadingKind::Refreshable) {
            selection.push(&mut seen, slot.clone());
        }
    }
    collect_queued(config, queues, &mut selection, &mut seen);
    selection
}

/// Slots selected by queued refresh requests alone.
pub fn select_queued_slots(config: &StaticConfig, queues: &RefreshQueues) -> SlotSelection {
    let mut selection = SlotSelection::default();
    let mut seen = HashSet::new();
    collect_queued(config, queues, &mut selection, &mut seen);
    selection
}

/// Configured slots with one of `dom_ids` and the requested loading behaviour.
pub fn select_refresh_slots(
    config: &StaticConfig,
    dom_ids: &[String],
    loaded: LoadingKind,
) -> SlotSelection {
    let mut selection = SlotSelection::default();
    let mut seen = HashSet::new();
    for dom_id in dom_ids {
        match config.slot(dom_id) {
            Some(slot) if slot.loading_kind() == loaded => selection.push(&mut seen, slot.clone()),
            Some(_) => {}
            None => selection.unknown.push(dom_id.clone()),
        }
    }
    selection
}

/// Slots of `bucket` with the requested loading behaviour.
///
/// Lazy slots only load through their trigger.
pub fn select_bucket_slots(
    config: &StaticConfig,
    bucket: &str,
    loaded: LoadingKind,
) -> Vec<AdSlot> {
    config
        .slots
        .iter()
        .filter(|slot| slot.bucket.as_deref() == Some(bucket))
        .filter(|slot| slot.loading_kind() == loaded && loaded != LoadingKind::Lazy)
        .cloned()
        .collect()
}

/// Clone the configured infinite slot `id_of_configured_slot` under `dom_id`.
pub fn infinite_clone(
    config: &StaticConfig,
    dom_id: &str,
    id_of_configured_slot: &str,
) -> Option<AdSlot> {
    config
        .slot(id_of_configured_slot)
        .filter(|slot| matches!(slot.behaviour, SlotLoading::Infinite { .. }))
        .map(|slot| slot.clone_as(dom_id))
}

fn collect_queued(
    config: &StaticConfig,
    queues: &RefreshQueues,
    selection: &mut SlotSelection,
    seen: &mut HashSet<String>,
) {
    for request in &queues.slots {
        match config.slot(&request.dom_id) {
            Some(slot) if slot.loading_kind() == request.options.loaded => {
                selection.push(seen, slot.clone())
            }
            Some(_) => {}
            None => selection.unknown.push(request.dom_id.clone()),
        }
    }
    for request in &queues.buckets {
        for slot in select_bucket_slots(config, &request.bucket, request.options.loaded) {
            selection.push(seen, slot);
        }
    }
    for request in &queues.infinite_slots {
        match infinite_clone(config, &request.dom_id, &request.id_of_configured_slot) {
            Some(clone) => selection.push(seen, clone),
            None => selection.unknown.push(request.id_of_configured_slot.clone()),
        }
    }
}
