// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{LoadingKind, StaticConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A targeting value: a single string or a list of strings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TargetingValue {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for TargetingValue {
    fn from(value: &str) -> Self {
        TargetingValue::Single(value.to_string())
    }
}

impl From<String> for TargetingValue {
    fn from(value: String) -> Self {
        TargetingValue::Single(value)
    }
}

impl From<Vec<String>> for TargetingValue {
    fn from(values: Vec<String>) -> Self {
        TargetingValue::Multiple(values)
    }
}

/// Terminal state reported to `afterRequestAds` listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterRequestAdsState {
    Finished,
    Error,
    SpaFinished,
}

impl AfterRequestAdsState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AfterRequestAdsState::Finished => "finished",
            AfterRequestAdsState::Error => "error",
            AfterRequestAdsState::SpaFinished => "spa-finished",
        }
    }
}

impl fmt::Display for AfterRequestAdsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called right before a cycle's configuration is frozen.
pub type BeforeRequestAdsHook =
    Arc<dyn Fn(&StaticConfig, &RuntimeConfig) -> anyhow::Result<()> + Send + Sync>;

/// Called once a cycle settles.
pub type AfterRequestAdsHook =
    Arc<dyn Fn(AfterRequestAdsState) -> anyhow::Result<()> + Send + Sync>;

/// Handle returned when a hook is registered; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    pub(crate) fn next() -> Self {
        static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);
        HookId(NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Registered publisher hooks, in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_request_ads: Vec<(HookId, BeforeRequestAdsHook)>,
    pub after_request_ads: Vec<(HookId, AfterRequestAdsHook)>,
}

impl Hooks {
    /// Remove a hook of either kind. Returns whether anything was removed.
    pub fn remove(&mut self, id: HookId) -> bool {
        let before = self.before_request_ads.len() + self.after_request_ads.len();
        self.before_request_ads.retain(|(hook_id, _)| *hook_id != id);
        self.after_request_ads.retain(|(hook_id, _)| *hook_id != id);
        before != self.before_request_ads.len() + self.after_request_ads.len()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_request_ads", &self.before_request_ads.len())
            .field("after_request_ads", &self.after_request_ads.len())
            .finish()
    }
}

/// Options accepted by `refreshAdSlot` and `refreshBucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshOptions {
    /// Only slots with this loading behaviour are refreshed (manual by default)
    pub loaded: LoadingKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSlotRequest {
    pub dom_id: String,
    pub options: RefreshOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfiniteSlotRequest {
    pub dom_id: String,
    pub id_of_configured_slot: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshBucketRequest {
    pub bucket: String,
    pub options: RefreshOptions,
}

/// Refresh requests drained from a [`RuntimeConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshQueues {
    pub slots: Vec<RefreshSlotRequest>,
    pub infinite_slots: Vec<InfiniteSlotRequest>,
    pub buckets: Vec<RefreshBucketRequest>,
}

impl RefreshQueues {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.infinite_slots.is_empty() && self.buckets.is_empty()
    }
}

/// Page-lifetime overlay on top of the static configuration.
///
/// One instance accumulates publisher calls until a cycle starts; the
/// cycle then consumes a frozen copy while a fresh instance collects the
/// calls made in the meantime.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub key_values: HashMap<String, TargetingValue>,
    pub labels: Vec<String>,
    pub ad_unit_path_variables: HashMap<String, String>,
    pub hooks: Hooks,
    pub refresh_slots: Vec<RefreshSlotRequest>,
    pub refresh_infinite_slots: Vec<InfiniteSlotRequest>,
    pub refresh_buckets: Vec<RefreshBucketRequest>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_targeting(&mut self, key: impl Into<String>, value: impl Into<TargetingValue>) {
        self.key_values.insert(key.into(), value.into());
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    pub fn has_pending_refreshes(&self) -> bool {
        !self.refresh_slots.is_empty()
            || !self.refresh_infinite_slots.is_empty()
            || !self.refresh_buckets.is_empty()
    }

    /// Drain all queued refresh requests.
    pub fn take_refresh_queues(&mut self) -> RefreshQueues {
        RefreshQueues {
            slots: std::mem::take(&mut self.refresh_slots),
            infinite_slots: std::mem::take(&mut self.refresh_infinite_slots),
            buckets: std::mem::take(&mut self.refresh_buckets),
        }
    }

    /// Fresh runtime config for the next cycle.
    ///
    /// Hooks and ad unit path variables always carry over, targeting only
    /// when `keep_targeting` is set. Refresh queues never carry over.
    pub fn carry_forward(&self, keep_targeting: bool) -> RuntimeConfig {
        let mut next = RuntimeConfig {
            hooks: self.hooks.clone(),
            ad_unit_path_variables: self.ad_unit_path_variables.clone(),
            ..RuntimeConfig::default()
        };
        if keep_targeting {
            next.key_values = self.key_values.clone();
            next.labels = self.labels.clone();
        }
        next
    }
}
