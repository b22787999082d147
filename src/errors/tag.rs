// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use crate::tag::StateKind;
use thiserror::Error;

/// Errors surfaced by the publisher-facing tag API.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The operation is not legal in the current state
    #[error("'{operation}' is not allowed in state '{state}'")]
    InvalidState {
        operation: &'static str,
        state: StateKind,
    },

    /// `requestAds()` was called again without the page having navigated
    #[error("ads were already requested for '{href}'; the location has not changed")]
    LocationUnchanged { href: String },

    #[error("no configured infinite slot with dom id '{0}'")]
    UnknownSlot(String),
}
