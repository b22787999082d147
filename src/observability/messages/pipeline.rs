// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for ad pipeline runs.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion, failure, empty runs)
//! * The memoized init phase
//! * Phase and priority tier progress
//! * Step failures and integration timeouts

use crate::errors::{Phase, PipelineError, StepError};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::{Level, Span};

/// A pipeline run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tag_pipeline::observability::messages::pipeline::PipelineRunStarted;
///
/// let msg = PipelineRunStarted { request_id: 2, slot_count: 4 };
/// assert_eq!(msg.to_string(), "Pipeline run 2 started for 4 slots");
/// ```
pub struct PipelineRunStarted {
    pub request_id: u64,
    pub slot_count: usize,
}

impl Display for PipelineRunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline run {} started for {} slots",
            self.request_id, self.slot_count
        )
    }
}

impl StructuredLog for PipelineRunStarted {
    fn level(&self) -> Level {
        Level::INFO
    }

    fn log(&self) {
        tracing::info!(
            request_id = self.request_id,
            slot_count = self.slot_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_run",
            span_name = name,
            request_id = self.request_id,
            slot_count = self.slot_count,
        )
    }
}

/// A pipeline run completed every phase.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineRunCompleted {
    pub request_id: u64,
    pub duration: Duration,
}

impl Display for PipelineRunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline run {} completed in {:?}",
            self.request_id, self.duration
        )
    }
}

impl StructuredLog for PipelineRunCompleted {
    fn level(&self) -> Level {
        Level::INFO
    }

    fn log(&self) {
        tracing::info!(
            request_id = self.request_id,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A pipeline run failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PipelineRunFailed<'a> {
    pub request_id: u64,
    pub error: &'a PipelineError,
}

impl Display for PipelineRunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline run {} failed: {}", self.request_id, self.error)
    }
}

impl StructuredLog for PipelineRunFailed<'_> {
    fn level(&self) -> Level {
        Level::ERROR
    }

    fn log(&self) {
        tracing::error!(
            request_id = self.request_id,
            phase = self.error.phase().map(|p| p.as_str()).unwrap_or("internal"),
            error = %self.error,
            "{}", self
        );
    }
}

/// A run was requested without any slots; nothing was executed.
///
/// # Log Level
/// `debug!`
pub struct EmptyRequestSkipped {
    pub request_id: u64,
}

impl Display for EmptyRequestSkipped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline run {} skipped: no slots to request",
            self.request_id
        )
    }
}

impl StructuredLog for EmptyRequestSkipped {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(request_id = self.request_id, "{}", self);
    }
}

/// The init phase settled. Emitted once per pipeline.
///
/// # Log Level
/// `info!` on success, `error!` on failure
pub struct InitPhaseSettled<'a> {
    pub step_count: usize,
    pub duration: Duration,
    pub error: Option<&'a PipelineError>,
}

impl Display for InitPhaseSettled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.error {
            None => write!(
                f,
                "Init phase completed: {} steps in {:?}",
                self.step_count, self.duration
            ),
            Some(error) => write!(
                f,
                "Init phase failed after {:?}: {} (cached for the page lifetime)",
                self.duration, error
            ),
        }
    }
}

impl StructuredLog for InitPhaseSettled<'_> {
    fn level(&self) -> Level {
        if self.error.is_some() {
            Level::ERROR
        } else {
            Level::INFO
        }
    }

    fn log(&self) {
        let duration_ms = self.duration.as_millis() as u64;
        match self.error {
            None => tracing::info!(step_count = self.step_count, duration_ms, "{}", self),
            Some(error) => tracing::error!(
                step_count = self.step_count,
                duration_ms,
                error = %error,
                "{}", self
            ),
        }
    }
}

pub struct PhaseStarted {
    pub request_id: u64,
    pub phase: Phase,
    pub step_count: usize,
}

impl Display for PhaseStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Request {}: {} phase started with {} steps",
            self.request_id, self.phase, self.step_count
        )
    }
}

impl StructuredLog for PhaseStarted {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(
            request_id = self.request_id,
            phase = self.phase.as_str(),
            step_count = self.step_count,
            "{}", self
        );
    }
}

pub struct PrepareTierStarted {
    pub request_id: u64,
    pub priority: i32,
    pub step_count: usize,
}

impl Display for PrepareTierStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Request {}: prepareRequestAds tier {} started with {} steps",
            self.request_id, self.priority, self.step_count
        )
    }
}

impl StructuredLog for PrepareTierStarted {
    fn level(&self) -> Level {
        Level::DEBUG
    }

    fn log(&self) {
        tracing::debug!(
            request_id = self.request_id,
            priority = self.priority,
            step_count = self.step_count,
            "{}", self
        );
    }
}

/// A single step failed.
///
/// # Log Level
/// `warn!` - the run-level failure is logged separately
pub struct StepFailed<'a> {
    pub phase: Phase,
    pub step: &'a str,
    pub error: &'a StepError,
}

impl Display for StepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} step '{}' failed: {}",
            self.phase, self.step, self.error
        )
    }
}

impl StructuredLog for StepFailed<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(
            phase = self.phase.as_str(),
            step = self.step,
            error = %self.error,
            "{}", self
        );
    }
}

/// An integration edge gave up waiting and continues degraded.
///
/// # Log Level
/// `warn!`
pub struct IntegrationTimedOut<'a> {
    pub what: &'a str,
    pub timeout: Duration,
}

impl Display for IntegrationTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Timed out after {:?} waiting for {}; continuing without it",
            self.timeout, self.what
        )
    }
}

impl StructuredLog for IntegrationTimedOut<'_> {
    fn level(&self) -> Level {
        Level::WARN
    }

    fn log(&self) {
        tracing::warn!(
            what = self.what,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}
