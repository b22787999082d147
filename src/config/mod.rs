// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod ad_unit_path;
mod labels;
mod loader;
mod runtime_config;
mod slot;
mod validation;

pub mod consts;

pub use ad_unit_path::resolve_ad_unit_path;
pub use labels::LabelFilter;
pub use loader::{
    load_and_validate_config, load_config, SpaConfig, StaticConfig, Targeting, ValidateLocation,
};
pub use runtime_config::{
    AfterRequestAdsHook, AfterRequestAdsState, BeforeRequestAdsHook, HookId, Hooks,
    InfiniteSlotRequest, RefreshBucketRequest, RefreshOptions, RefreshQueues, RefreshSlotRequest,
    RuntimeConfig, TargetingValue,
};
pub use slot::{AdSize, AdSlot, EventTrigger, LoadingKind, SlotLoading, TriggerSource};
pub use validation::validate_static_config;
