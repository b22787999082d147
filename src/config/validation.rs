// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{EventTrigger, SlotLoading, StaticConfig, TriggerSource};
use crate::errors::ConfigError;
use std::collections::HashSet;

/// Validate the slots of a static configuration.
///
/// Checks, in order:
/// 1. every slot has a non-empty dom id and ad unit path
/// 2. dom ids are unique
/// 3. behaviours are well formed (non-empty trigger events and selectors,
///    non-zero refresh throttles)
///
/// Returns the first problem found.
pub fn validate_static_config(config: &StaticConfig) -> Result<(), ConfigError> {
    validate_required_fields(config)?;
    validate_unique_dom_ids(config)?;
    validate_behaviours(config)
}

fn validate_required_fields(config: &StaticConfig) -> Result<(), ConfigError> {
    for slot in &config.slots {
        if slot.dom_id.trim().is_empty() {
            return Err(ConfigError::InvalidSlot {
                dom_id: slot.dom_id.clone(),
                reason: "dom_id must not be empty".into(),
            });
        }
        if slot.ad_unit_path.trim().is_empty() {
            return Err(ConfigError::InvalidSlot {
                dom_id: slot.dom_id.clone(),
                reason: "ad_unit_path must not be empty".into(),
            });
        }
    }
    Ok(())
}

fn validate_unique_dom_ids(config: &StaticConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for slot in &config.slots {
        if !seen.insert(slot.dom_id.as_str()) {
            return Err(ConfigError::DuplicateDomId {
                dom_id: slot.dom_id.clone(),
            });
        }
    }
    Ok(())
}

fn validate_behaviours(config: &StaticConfig) -> Result<(), ConfigError> {
    for slot in &config.slots {
        let invalid = |reason: &str| ConfigError::InvalidSlot {
            dom_id: slot.dom_id.clone(),
            reason: reason.to_string(),
        };

        match &slot.behaviour {
            SlotLoading::Eager | SlotLoading::Manual => {}
            SlotLoading::Infinite { selector } => {
                if selector.trim().is_empty() {
                    return Err(invalid("infinite slots need a selector"));
                }
            }
            SlotLoading::Lazy { trigger } => validate_trigger(trigger).map_err(|r| invalid(r))?,
            SlotLoading::Refreshable { trigger, throttle } => {
                validate_trigger(trigger).map_err(|r| invalid(r))?;
                if *throttle == Some(0) {
                    return Err(invalid("refresh throttle must be at least one second"));
                }
            }
        }
    }
    Ok(())
}

fn validate_trigger(trigger: &EventTrigger) -> Result<(), &'static str> {
    if trigger.event.trim().is_empty() {
        return Err("trigger event must not be empty");
    }
    if let TriggerSource::Selector(selector) = &trigger.source {
        if selector.trim().is_empty() {
            return Err("trigger selector must not be empty");
        }
    }
    Ok(())
}
