// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the publisher-facing tag.
//!
//! These are also forwarded to a logger installed with `setLogger`.

use crate::errors::{ConfigError, EventSourceError, PipelineError, TagError};
use crate::observability::messages::StructuredLog;
use crate::tag::StateKind;
use std::fmt::{Display, Formatter};
use tracing::Level;

/// The tag moved to a new state.
///
/// # Log Level
/// `info!`
pub struct StateTransition {
    pub from: StateKind,
    pub to: StateKind,
}

impl Display for StateTransition {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "State changed from '{}' to '{}'", self.from, self.to)
    }
}

impl StructuredLog for StateTransition {
    fn level(&self) -> Level {
        Level::INFO
    }

    fn log(&self) {
        tracing::info!(from = self.from.as_str(), to = self.to.as_str(), "{}", self);
    }
}

/// A call is not legal in the current state and was ignored.
///
/// # Log Level
/// `warn!` - a configuration error on the publisher's side, never raised
pub struct ConfigurationRejected<'a> {
    pub operation: &'a str,
    pub state: StateKind,
}

impl Display for ConfigurationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring '{}': not allowed in state '{}'",
            self.operation, self.state
        )
    }
}

impl StructuredLog for ConfigurationRejected<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(operation = self.operation, state = self.state.as_str(), "{}", self);
    }
}

/// The static config handed to `configure()` failed validation.
///
/// # Log Level
/// `error!`
pub struct InvalidConfiguration<'a> {
    pub error: &'a ConfigError,
}

impl Display for InvalidConfiguration<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration rejected: {}", self.error)
    }
}

impl StructuredLog for InvalidConfiguration<'_> {
    fn level(&self) -> Level {
        Level::ERROR
    }

    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

pub struct ModuleSkipped<'a> {
    pub module: &'a str,
    pub error: &'a ConfigError,
}

impl Display for ModuleSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' skipped: {}", self.module, self.error)
    }
}

impl StructuredLog for ModuleSkipped<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(module = self.module, error = %self.error, "{}", self);
    }
}

/// A publisher hook returned an error. Other hooks still run.
///
/// # Log Level
/// `warn!`
pub struct HookFailed<'a> {
    pub hook: &'a str,
    pub error: &'a anyhow::Error,
}

impl Display for HookFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} hook failed: {:#}", self.hook, self.error)
    }
}

impl StructuredLog for HookFailed<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(hook = self.hook, error = %self.error, "{}", self);
    }
}

/// `requestAds()` in SPA mode without a navigation since the last cycle.
///
/// # Log Level
/// `warn!`
pub struct LocationUnchanged<'a> {
    pub href: &'a str,
}

impl Display for LocationUnchanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "requestAds rejected: location '{}' has not changed since the last cycle",
            self.href
        )
    }
}

impl StructuredLog for LocationUnchanged<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(href = self.href, "{}", self);
    }
}

/// A `requestAds()` cycle started.
///
/// # Log Level
/// `info!`
pub struct CycleStarted {
    pub request_ads_calls: u64,
    pub slot_count: usize,
    pub spa: bool,
}

impl Display for CycleStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "requestAds cycle {} started with {} slots{}",
            self.request_ads_calls,
            self.slot_count,
            if self.spa { " (spa)" } else { "" }
        )
    }
}

impl StructuredLog for CycleStarted {
    fn level(&self) -> Level {
        Level::INFO
    }

    fn log(&self) {
        tracing::info!(
            request_ads_calls = self.request_ads_calls,
            slot_count = self.slot_count,
            spa = self.spa,
            "{}", self
        );
    }
}

pub struct StaleCycleDiscarded {
    pub cycle: u64,
}

impl Display for StaleCycleDiscarded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "SPA cycle {} settled after the page moved on; result discarded",
            self.cycle
        )
    }
}

impl StructuredLog for StaleCycleDiscarded {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(cycle = self.cycle, "{}", self);
    }
}

pub struct RefreshQueued<'a> {
    pub operation: &'a str,
    pub target: &'a str,
    pub state: StateKind,
}

impl Display for RefreshQueued<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' queued in state '{}'",
            self.operation, self.target, self.state
        )
    }
}

impl StructuredLog for RefreshQueued<'_> {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(
            operation = self.operation,
            target = self.target,
            state = self.state.as_str(),
            "{}", self
        );
    }
}

/// A refresh went through the pipeline.
///
/// # Log Level
/// `info!`
pub struct RefreshExecuted<'a> {
    pub dom_ids: &'a [String],
}

impl Display for RefreshExecuted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Refreshed slots [{}]", self.dom_ids.join(", "))
    }
}

impl StructuredLog for RefreshExecuted<'_> {
    fn level(&self) -> Level {
        Level::INFO
    }

    fn log(&self) {
        tracing::info!(slot_count = self.dom_ids.len(), "{}", self);
    }
}

/// # Log Level
/// `error!`
pub struct RefreshFailed<'a> {
    pub error: &'a PipelineError,
}

impl Display for RefreshFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Refresh failed: {}", self.error)
    }
}

impl StructuredLog for RefreshFailed<'_> {
    fn level(&self) -> Level {
        Level::ERROR
    }

    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

pub struct UnknownSlotsSkipped<'a> {
    pub dom_ids: &'a [String],
}

impl Display for UnknownSlotsSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping unknown slots [{}]",
            self.dom_ids.join(", ")
        )
    }
}

impl StructuredLog for UnknownSlotsSkipped<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(slot_count = self.dom_ids.len(), "{}", self);
    }
}

/// Slots skipped because they were refreshed within the throttle window.
///
/// # Log Level
/// `debug!`
pub struct SlotsThrottled<'a> {
    pub dom_ids: &'a [String],
}

impl Display for SlotsThrottled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Throttled slots [{}]", self.dom_ids.join(", "))
    }
}

impl StructuredLog for SlotsThrottled<'_> {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(slot_count = self.dom_ids.len(), "{}", self);
    }
}

pub struct TriggerBindingFailed<'a> {
    pub dom_id: &'a str,
    pub error: &'a EventSourceError,
}

impl Display for TriggerBindingFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Could not bind trigger of slot '{}': {}",
            self.dom_id, self.error
        )
    }
}

impl StructuredLog for TriggerBindingFailed<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(dom_id = self.dom_id, error = %self.error, "{}", self);
    }
}

/// A trigger fired but the tag refused to refresh its slot.
///
/// # Log Level
/// `warn!`
pub struct TriggerRefreshRejected<'a> {
    pub dom_id: &'a str,
    pub error: &'a TagError,
}

impl Display for TriggerRefreshRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trigger of slot '{}' did not refresh it: {}",
            self.dom_id, self.error
        )
    }
}

impl StructuredLog for TriggerRefreshRejected<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(dom_id = self.dom_id, error = %self.error, "{}", self);
    }
}

pub struct CommandQueueDrained {
    pub command_count: usize,
}

impl Display for CommandQueueDrained {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Command queue drained {} commands", self.command_count)
    }
}

impl StructuredLog for CommandQueueDrained {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(command_count = self.command_count, "{}", self);
    }
}
