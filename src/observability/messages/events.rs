// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for native event wiring and render tracking.

use crate::observability::messages::StructuredLog;
use crate::traits::EventScope;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Level;

/// A native listener was attached for a new (scope, event) pair.
///
/// # Log Level
/// `debug!`
pub struct EventSourceCreated<'a> {
    pub event: &'a str,
    pub scope: &'a EventScope,
    pub throttle: Option<Duration>,
}

impl Display for EventSourceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.throttle {
            Some(throttle) => write!(
                f,
                "Event source '{}' on {} created (throttle {:?})",
                self.event, self.scope, throttle
            ),
            None => write!(f, "Event source '{}' on {} created", self.event, self.scope),
        }
    }
}

impl StructuredLog for EventSourceCreated<'_> {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(
            event = self.event,
            scope = %self.scope,
            throttle_ms = self.throttle.map(|t| t.as_millis() as u64),
            "{}", self
        );
    }
}

pub struct EventSourceRemoved<'a> {
    pub event: &'a str,
    pub scope: &'a EventScope,
}

impl Display for EventSourceRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Event source '{}' on {} removed", self.event, self.scope)
    }
}

impl StructuredLog for EventSourceRemoved<'_> {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(event = self.event, scope = %self.scope, "{}", self);
    }
}

/// A native event arrived inside the source's throttle window and was dropped.
///
/// # Log Level
/// `trace!` - high-frequency events such as scroll
pub struct EventThrottled<'a> {
    pub event: &'a str,
    pub scope: &'a EventScope,
}

impl Display for EventThrottled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Event '{}' on {} throttled", self.event, self.scope)
    }
}

impl StructuredLog for EventThrottled<'_> {
    fn level(&self) -> Level {
        Level::TRACE
    }

    fn log(&self) {
        tracing::trace!(event = self.event, scope = %self.scope, "{}", self);
    }
}

/// A selector-scoped trigger matched no element.
///
/// # Log Level
/// `warn!`
pub struct SelectorNotFound<'a> {
    pub selector: &'a str,
    pub event: &'a str,
}

impl Display for SelectorNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No element matches '{}'; cannot listen for '{}'",
            self.selector, self.event
        )
    }
}

impl StructuredLog for SelectorNotFound<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(selector = self.selector, event = self.event, "{}", self);
    }
}

pub struct RenderTrackingCompleted {
    pub slot_count: usize,
}

impl Display for RenderTrackingCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "All {} tracked slots finished rendering", self.slot_count)
    }
}

impl StructuredLog for RenderTrackingCompleted {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(slot_count = self.slot_count, "{}", self);
    }
}
