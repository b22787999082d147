// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a static ad configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("unsupported config format '{extension}' (expected yaml, yml, json or toml)")]
    UnsupportedFormat { extension: String },

    /// Two slots share the same dom id
    #[error("duplicate slot dom id: '{dom_id}'")]
    DuplicateDomId { dom_id: String },

    #[error("slot '{dom_id}' is invalid: {reason}")]
    InvalidSlot { dom_id: String, reason: String },

    /// A registered module needs a sub-config under `modules.<name>` that is absent
    #[error("module '{module}' requires a 'modules.{module}' configuration section")]
    MissingSubConfig { module: String },

    #[error("module '{module}' rejected its configuration: {reason}")]
    InvalidSubConfig { module: String, reason: String },
}
