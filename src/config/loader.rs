// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{AdSlot, TargetingValue};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Immutable ad configuration handed to `configure()` once per page load.
///
/// Every optional section resolves to its default while deserializing, so
/// the engine never has to re-derive defaults at call sites.
///
/// # Example
/// ```yaml
/// request_ads: false
/// throttle: 10
/// domain: example.com
/// spa:
///   enabled: true
///   validate_location: path
///   keep_targeting: false
/// targeting:
///   key_values:
///     channel: sports
///   labels: ["desktop"]
/// ad_unit_path_variables:
///   device: desktop
/// modules:
///   consent:
///     timeout_ms: 500
/// slots:
///   - dom_id: "ad-top"
///     ad_unit_path: "/1234/{device}/top"
///     sizes: [[728, 90]]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StaticConfig {
    pub slots: Vec<AdSlot>,
    #[serde(default)]
    pub targeting: Targeting,
    #[serde(default)]
    pub spa: SpaConfig,
    /// Start the first `requestAds()` cycle as soon as `configure()` succeeds
    #[serde(default)]
    pub request_ads: bool,
    /// Minimum seconds between two refreshes of the same slot
    #[serde(default)]
    pub throttle: Option<u64>,
    /// Overrides the domain label derived from the page hostname
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub ad_unit_path_variables: HashMap<String, String>,
    /// Module sub-configurations keyed by module name
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

impl StaticConfig {
    pub fn slot(&self, dom_id: &str) -> Option<&AdSlot> {
        self.slots.iter().find(|slot| slot.dom_id == dom_id)
    }

    pub fn module_config(&self, module: &str) -> Option<&serde_json::Value> {
        self.modules.get(module)
    }
}

/// Static targeting applied to every request.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Targeting {
    #[serde(default)]
    pub key_values: HashMap<String, TargetingValue>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Single-page-application settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SpaConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub validate_location: ValidateLocation,
    /// Carry key-values and labels from one cycle into the next
    #[serde(default)]
    pub keep_targeting: bool,
}

impl Default for SpaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            validate_location: ValidateLocation::Href,
            keep_targeting: false,
        }
    }
}

/// How two page locations are compared to decide whether the page navigated.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidateLocation {
    /// Never treat the page as navigated
    None,
    /// Compare the full href
    #[default]
    Href,
    /// Compare only the path, ignoring query string and fragment
    Path,
}

/// Load a static config, choosing the format by file extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StaticConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let parse_error = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        "json" => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        "toml" => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat { extension }),
    }
}

/// Load a static config and validate its slots.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<StaticConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_static_config(&cfg)?;
    Ok(cfg)
}
