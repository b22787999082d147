// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

/// A configured ad slot.
///
/// # Example
/// ```yaml
/// dom_id: "ad-sidebar"
/// ad_unit_path: "/1234/{device}/sidebar"
/// sizes: [[300, 250], [300, 600]]
/// bucket: "below-the-fold"
/// label_all: ["desktop"]
/// behaviour:
///   loaded: refreshable
///   trigger:
///     event: "user-scrolled"
///     source: window
///   throttle: 30
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AdSlot {
    pub dom_id: String,
    pub ad_unit_path: String,
    #[serde(default)]
    pub sizes: Vec<AdSize>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub label_all: Vec<String>,
    #[serde(default)]
    pub label_any: Vec<String>,
    #[serde(default)]
    pub behaviour: SlotLoading,
}

impl AdSlot {
    pub fn loading_kind(&self) -> LoadingKind {
        self.behaviour.kind()
    }

    /// Clone this slot under a new dom id as a manually loaded slot.
    pub fn clone_as(&self, dom_id: &str) -> AdSlot {
        AdSlot {
            dom_id: dom_id.to_string(),
            behaviour: SlotLoading::Manual,
            ..self.clone()
        }
    }
}

/// Fixed creative size, written as `[width, height]`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
pub struct AdSize(pub u32, pub u32);

/// When a slot is requested.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(tag = "loaded", rename_all = "snake_case")]
pub enum SlotLoading {
    /// Requested with the first `requestAds()` cycle
    #[default]
    Eager,
    /// Requested only through `refreshAdSlot` or `refreshBucket`
    Manual,
    /// Template for clones created by `refreshInfiniteAdSlot`
    Infinite { selector: String },
    /// Requested the first time its trigger fires
    Lazy { trigger: EventTrigger },
    /// Requested eagerly, then again whenever its trigger fires
    Refreshable {
        trigger: EventTrigger,
        #[serde(default)]
        throttle: Option<u64>,
    },
}

impl SlotLoading {
    pub fn kind(&self) -> LoadingKind {
        match self {
            SlotLoading::Eager => LoadingKind::Eager,
            SlotLoading::Manual => LoadingKind::Manual,
            SlotLoading::Infinite { .. } => LoadingKind::Infinite,
            SlotLoading::Lazy { .. } => LoadingKind::Lazy,
            SlotLoading::Refreshable { .. } => LoadingKind::Refreshable,
        }
    }
}

/// Discriminant of [`SlotLoading`], used to match refresh requests to slots.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadingKind {
    Eager,
    #[default]
    Manual,
    Infinite,
    Lazy,
    Refreshable,
}

/// A native event that loads or refreshes a slot.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
pub struct EventTrigger {
    pub event: String,
    #[serde(default)]
    pub source: TriggerSource,
}

/// Where the native listener for a trigger is attached.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Window,
    #[default]
    Document,
    /// CSS selector, resolved when the event source is created
    Selector(String),
}
