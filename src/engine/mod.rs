// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod pipeline;
pub mod pipeline_config;
pub mod timeout;

pub use context::{AdPipelineContext, AdServerSlot, SizeFilter, SlotDefinition};
pub use pipeline::AdPipeline;
pub use pipeline_config::PipelineConfiguration;
pub use timeout::await_with_degraded_timeout;
