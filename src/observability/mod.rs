// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output goes through typed message structs with a
//! `Display` implementation instead of ad hoc format strings. Messages are
//! organized by subsystem:
//! * `messages::pipeline` - pipeline runs, phases and step failures
//! * `messages::tag` - tag state machine transitions, hooks and refreshes
//! * `messages::events` - event source registry and render tracking
//!
//! # Usage
//!
//! ```rust
//! use tag_pipeline::observability::messages::pipeline::EmptyRequestSkipped;
//! use tag_pipeline::observability::messages::StructuredLog;
//!
//! EmptyRequestSkipped { request_id: 3 }.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
