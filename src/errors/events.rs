// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the event source registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventSourceError {
    /// A selector-scoped trigger matched no element at creation time
    #[error("no element matches selector '{selector}' for event '{event}'")]
    SelectorNotFound { selector: String, event: String },
}
