// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::traits::{
    ConfigureStep, DefineSlotsStep, InitStep, PipelineContribution, PrepareRequestAdsStep,
    RequestAdsStep, RequestBidsStep,
};

/// Ordered step lists per pipeline phase.
///
/// The core integrations provide the single DefineSlots and RequestAds
/// steps; modules add to the other phases through [`PipelineContribution`].
#[derive(Clone)]
pub struct PipelineConfiguration {
    pub init: Vec<Arc<dyn InitStep>>,
    pub configure: Vec<Arc<dyn ConfigureStep>>,
    pub define_slots: Arc<dyn DefineSlotsStep>,
    pub prepare_request_ads: Vec<Arc<dyn PrepareRequestAdsStep>>,
    pub request_bids: Vec<Arc<dyn RequestBidsStep>>,
    pub request_ads: Arc<dyn RequestAdsStep>,
}

impl PipelineConfiguration {
    pub fn new(
        define_slots: Arc<dyn DefineSlotsStep>,
        request_ads: Arc<dyn RequestAdsStep>,
    ) -> Self {
        Self {
            init: Vec::new(),
            configure: Vec::new(),
            define_slots,
            prepare_request_ads: Vec::new(),
            request_bids: Vec::new(),
            request_ads,
        }
    }

    pub fn with_init(mut self, step: Arc<dyn InitStep>) -> Self {
        self.init.push(step);
        self
    }

    pub fn with_configure(mut self, step: Arc<dyn ConfigureStep>) -> Self {
        self.configure.push(step);
        self
    }

    pub fn with_prepare_request_ads(mut self, step: Arc<dyn PrepareRequestAdsStep>) -> Self {
        self.prepare_request_ads.push(step);
        self
    }

    pub fn with_request_bids(mut self, step: Arc<dyn RequestBidsStep>) -> Self {
        self.request_bids.push(step);
        self
    }

    /// Append a module's steps after the ones already present.
    pub fn merge(&mut self, contribution: PipelineContribution) {
        self.init.extend(contribution.init);
        self.configure.extend(contribution.configure);
        self.prepare_request_ads
            .extend(contribution.prepare_request_ads);
        self.request_bids.extend(contribution.request_bids);
    }

    /// PrepareRequestAds steps grouped by priority, highest first.
    pub fn priority_tiers(&self) -> Vec<(i32, Vec<Arc<dyn PrepareRequestAdsStep>>)> {
        let mut tiers: BTreeMap<i32, Vec<Arc<dyn PrepareRequestAdsStep>>> = BTreeMap::new();
        for step in &self.prepare_request_ads {
            tiers.entry(step.priority()).or_default().push(step.clone());
        }
        tiers.into_iter().rev().collect()
    }
}

impl fmt::Debug for PipelineConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfiguration")
            .field("init", &self.init.iter().map(|s| s.name().to_string()).collect::<Vec<_>>())
            .field(
                "configure",
                &self.configure.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .field("define_slots", &self.define_slots.name())
            .field(
                "prepare_request_ads",
                &self
                    .prepare_request_ads
                    .iter()
                    .map(|s| format!("{}@{}", s.name(), s.priority()))
                    .collect::<Vec<_>>(),
            )
            .field(
                "request_bids",
                &self.request_bids.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .field("request_ads", &self.request_ads.name())
            .finish()
    }
}
