// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The ordered phases of an ad pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    Configure,
    DefineSlots,
    PrepareRequestAds,
    RequestBids,
    RequestAds,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Configure => "configure",
            Phase::DefineSlots => "defineSlots",
            Phase::PrepareRequestAds => "prepareRequestAds",
            Phase::RequestBids => "requestBids",
            Phase::RequestAds => "requestAds",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),

    /// An integration edge gave up waiting, e.g. for a third-party script to become ready
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl StepError {
    pub fn failed(reason: impl Into<String>) -> Self {
        StepError::Failed(reason.into())
    }
}

/// Errors that can occur while running the ad pipeline.
///
/// Errors are `Clone` because the outcome of the init phase is cached and
/// replayed to every later run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// An init step failed. Cached for the lifetime of the pipeline.
    #[error("initialization failed in step '{step}': {error}")]
    InitializationFailed { step: String, error: StepError },

    /// A step of any later phase failed; the remaining phases of that run are skipped
    #[error("{phase} step '{step}' failed: {error}")]
    StepFailed {
        phase: Phase,
        step: String,
        error: StepError,
    },

    #[error("internal pipeline error: {message}")]
    InternalError { message: String },
}

impl PipelineError {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PipelineError::InitializationFailed { .. } => Some(Phase::Init),
            PipelineError::StepFailed { phase, .. } => Some(*phase),
            PipelineError::InternalError { .. } => None,
        }
    }
}
