// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The publisher-facing tag: configuration lifecycle, request cycles and
//! single-page-application batching on top of the ad pipeline.

mod location;
mod logger;
mod machine;
mod queue;
mod slots;
mod state;
pub mod transitions;
mod triggers;

#[cfg(test)]
mod integration_tests;

pub use location::{domain_of, host_of, path_of};
pub use logger::TagLogger;
pub use machine::{RefreshOutcome, Tag, TagEventListener};
pub use queue::{CommandQueue, TagCommand};
pub use slots::{
    infinite_clone, select_bucket_slots, select_cycle_slots, select_queued_slots,
    select_refresh_slots, SlotSelection,
};
pub use state::StateKind;
