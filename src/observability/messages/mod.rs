// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message implements `Display` for its human-readable form and
//! [`StructuredLog`] to emit it as a `tracing` event with structured fields.
//!
//! * `pipeline` - pipeline run lifecycle, phases and step failures
//! * `tag` - state transitions, configuration errors, hooks, refreshes
//! * `events` - event source registry and render tracking
//!
//! ```rust
//! use tag_pipeline::observability::messages::tag::LocationUnchanged;
//! use tag_pipeline::observability::messages::StructuredLog;
//!
//! let msg = LocationUnchanged { href: "https://example.com/" };
//! msg.log();
//! assert_eq!(msg.level(), tracing::Level::WARN);
//! ```

pub mod events;
pub mod pipeline;
pub mod tag;

use std::fmt::Display;
use tracing::{Level, Span};

/// A log message that knows how to emit itself.
pub trait StructuredLog: Display {
    /// Level the message is emitted at.
    fn level(&self) -> Level;

    /// Emit the message as a tracing event with structured fields.
    fn log(&self);

    /// Span for work associated with the message.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("tag_pipeline", span_name = name)
    }
}
