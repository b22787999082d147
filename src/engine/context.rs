// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{
    resolve_ad_unit_path, AdSize, AdSlot, LabelFilter, RuntimeConfig, StaticConfig, TargetingValue,
};
use crate::events::RenderEndedEvents;

/// Handle returned by the ad-serving API when a slot is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdServerSlot {
    pub id: String,
    pub ad_unit_path: String,
}

/// Narrows candidate sizes to the ones a slot may serve.
pub type SizeFilter = Arc<dyn Fn(&[AdSize]) -> Vec<AdSize> + Send + Sync>;

/// A configured slot paired with its ad-server handle.
#[derive(Clone)]
pub struct SlotDefinition {
    pub slot: AdSlot,
    pub ad_server_slot: AdServerSlot,
    pub filter_supported_sizes: SizeFilter,
}

impl SlotDefinition {
    /// Pair a slot with its handle; the size filter keeps the slot's configured sizes.
    pub fn new(slot: AdSlot, ad_server_slot: AdServerSlot) -> Self {
        let configured = slot.sizes.clone();
        Self {
            slot,
            ad_server_slot,
            filter_supported_sizes: Arc::new(move |candidates: &[AdSize]| {
                candidates
                    .iter()
                    .filter(|size| configured.contains(size))
                    .copied()
                    .collect()
            }),
        }
    }

    pub fn with_size_filter(mut self, filter: SizeFilter) -> Self {
        self.filter_supported_sizes = filter;
        self
    }

    pub fn supported_sizes(&self, candidates: &[AdSize]) -> Vec<AdSize> {
        (self.filter_supported_sizes)(candidates)
    }

    pub fn dom_id(&self) -> &str {
        &self.slot.dom_id
    }
}

impl fmt::Debug for SlotDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDefinition")
            .field("slot", &self.slot.dom_id)
            .field("ad_server_slot", &self.ad_server_slot)
            .finish()
    }
}

/// Everything a step gets to see about the request it is part of.
///
/// Both configurations are frozen for the lifetime of the request.
#[derive(Clone)]
pub struct AdPipelineContext {
    /// 1-based ordinal of the `run()` call on the pipeline
    pub request_id: u64,
    /// Number of `requestAds()` cycles started so far
    pub request_ads_calls: u64,
    pub config: Arc<StaticConfig>,
    pub runtime: Arc<RuntimeConfig>,
    pub render_events: Arc<RenderEndedEvents>,
}

impl AdPipelineContext {
    /// Resolve placeholders, runtime variables taking precedence over static ones.
    pub fn resolve_ad_unit_path(&self, path: &str) -> String {
        let mut variables = self.config.ad_unit_path_variables.clone();
        variables.extend(
            self.runtime
                .ad_unit_path_variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        resolve_ad_unit_path(path, &variables)
    }

    /// Label filter over the union of static and runtime labels.
    pub fn label_filter(&self) -> LabelFilter {
        LabelFilter::new(
            self.config
                .targeting
                .labels
                .iter()
                .chain(self.runtime.labels.iter())
                .cloned(),
        )
    }

    /// Static key-values overlaid with runtime ones.
    pub fn key_values(&self) -> HashMap<String, TargetingValue> {
        let mut merged = self.config.targeting.key_values.clone();
        merged.extend(
            self.runtime
                .key_values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }
}

impl fmt::Debug for AdPipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdPipelineContext")
            .field("request_id", &self.request_id)
            .field("request_ads_calls", &self.request_ads_calls)
            .finish()
    }
}
