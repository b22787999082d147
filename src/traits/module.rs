// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::StaticConfig;
use crate::errors::ConfigError;
use crate::traits::{ConfigureStep, InitStep, PrepareRequestAdsStep, RequestBidsStep};

/// Pipeline steps contributed by a module.
#[derive(Default, Clone)]
pub struct PipelineContribution {
    pub init: Vec<Arc<dyn InitStep>>,
    pub configure: Vec<Arc<dyn ConfigureStep>>,
    pub prepare_request_ads: Vec<Arc<dyn PrepareRequestAdsStep>>,
    pub request_bids: Vec<Arc<dyn RequestBidsStep>>,
}

/// A pluggable integration registered with `registerModule`.
pub trait TagModule: Send + Sync {
    fn name(&self) -> &str;

    /// Build the module's steps from the static config.
    ///
    /// Modules read their own section via `config.module_config(self.name())`
    /// and return [`ConfigError::MissingSubConfig`] when it is required but absent.
    fn pipeline_steps(&self, config: &StaticConfig) -> Result<PipelineContribution, ConfigError>;
}
