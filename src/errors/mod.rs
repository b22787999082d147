// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod events;
mod pipeline;
mod tag;

pub use config::ConfigError;
pub use events::EventSourceError;
pub use pipeline::{Phase, PipelineError, StepError};
pub use tag::TagError;
