// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pure transition rules of the tag state machine.
//!
//! Each function maps the current [`StateKind`] and the facts gathered by
//! the caller to a decision. The side-effecting shell in `machine` applies it.

use crate::config::AfterRequestAdsState;
use crate::tag::StateKind;

/// What a `requestAds()` call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAdsDecision {
    /// Remember the call and start the cycle once configured
    MarkInitialize,
    StartCycle,
    /// SPA mode, but the page did not navigate since the last cycle
    RejectUnchangedLocation,
    /// Logged and otherwise ignored
    Ignore,
}

/// `location_changed` only matters in the SPA states.
pub fn request_ads_decision(state: StateKind, location_changed: bool) -> RequestAdsDecision {
    match state {
        StateKind::Configurable => RequestAdsDecision::MarkInitialize,
        StateKind::Configured => RequestAdsDecision::StartCycle,
        StateKind::SpaRequestAds | StateKind::SpaFinished if location_changed => {
            RequestAdsDecision::StartCycle
        }
        StateKind::SpaRequestAds | StateKind::SpaFinished => {
            RequestAdsDecision::RejectUnchangedLocation
        }
        StateKind::RequestAds | StateKind::Finished | StateKind::Error => {
            RequestAdsDecision::Ignore
        }
    }
}

/// Only a tag that was never configured accepts `configure()`.
pub fn configure_allowed(state: StateKind) -> bool {
    state == StateKind::Configurable
}

/// Modules contribute steps when the pipeline is built, so they must come first.
pub fn register_module_allowed(state: StateKind) -> bool {
    state == StateKind::Configurable
}

/// What a refresh call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDisposition {
    /// Stored on the runtime config that collects publisher calls
    Queue,
    /// Run through the pipeline right away
    Execute,
    Reject,
}

/// `same_page` only matters in `spa-finished`.
pub fn refresh_disposition(state: StateKind, same_page: bool) -> RefreshDisposition {
    match state {
        StateKind::Configurable | StateKind::Configured | StateKind::SpaRequestAds => {
            RefreshDisposition::Queue
        }
        StateKind::SpaFinished if same_page => RefreshDisposition::Execute,
        StateKind::SpaFinished => RefreshDisposition::Queue,
        StateKind::RequestAds | StateKind::Finished => RefreshDisposition::Execute,
        StateKind::Error => RefreshDisposition::Reject,
    }
}

/// Whether targeting, labels and path variables may still change.
pub fn accepts_mutations(state: StateKind) -> bool {
    matches!(
        state,
        StateKind::Configurable
            | StateKind::Configured
            | StateKind::SpaRequestAds
            | StateKind::SpaFinished
    )
}

/// Terminal state of a settled cycle and the name reported to `afterRequestAds`.
///
/// An SPA cycle always settles to `spa-finished`, even when it failed, so the
/// machine can never get stuck in `spa-requestAds`.
pub fn settled_state(spa_enabled: bool, succeeded: bool) -> (StateKind, AfterRequestAdsState) {
    match (spa_enabled, succeeded) {
        (true, _) => (StateKind::SpaFinished, AfterRequestAdsState::SpaFinished),
        (false, true) => (StateKind::Finished, AfterRequestAdsState::Finished),
        (false, false) => (StateKind::Error, AfterRequestAdsState::Error),
    }
}

/// What to do with the outcome of an SPA cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaSettlement {
    Apply,
    /// A later cycle started, or the page navigated while this one ran
    DiscardStale,
}

pub fn spa_settlement(
    state: StateKind,
    active_cycle: u64,
    settled_cycle: u64,
    same_page: bool,
) -> SpaSettlement {
    if state == StateKind::SpaRequestAds && active_cycle == settled_cycle && same_page {
        SpaSettlement::Apply
    } else {
        SpaSettlement::DiscardStale
    }
}
