// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::{AdSlot, RuntimeConfig, StaticConfig};
use crate::engine::{AdPipelineContext, PipelineConfiguration, SlotDefinition};
use crate::errors::{Phase, PipelineError, StepError};
use crate::events::RenderEndedEvents;
use crate::observability::messages::pipeline::{
    EmptyRequestSkipped, InitPhaseSettled, PhaseStarted, PipelineRunCompleted, PipelineRunFailed,
    PipelineRunStarted, PrepareTierStarted, StepFailed,
};
use crate::observability::messages::StructuredLog;

/// Phase-ordered executor for ad requests.
///
/// A run walks the phases in a fixed order:
/// 1. **Init**: all init steps concurrently. The outcome, success or
///    failure, is computed once per pipeline and replayed to every later run.
/// 2. **Configure**: all configure steps concurrently, on every run.
/// 3. **DefineSlots**: the single slot definition step.
/// 4. **PrepareRequestAds**: steps grouped into priority tiers. Steps within
///    a tier run concurrently; a tier starts only once every step of the
///    higher tiers has settled.
/// 5. **RequestBids**: all bid steps concurrently.
/// 6. **RequestAds**: the single ad request step.
///
/// The first failure short-circuits the remaining phases. Steps already
/// running in the failing phase are left to finish on their own; nothing is
/// cancelled.
pub struct AdPipeline {
    config: PipelineConfiguration,
    render_events: Arc<RenderEndedEvents>,
    init: OnceCell<Result<(), PipelineError>>,
    request_id: AtomicU64,
}

impl AdPipeline {
    pub fn new(config: PipelineConfiguration, render_events: Arc<RenderEndedEvents>) -> Self {
        Self {
            config,
            render_events,
            init: OnceCell::new(),
            request_id: AtomicU64::new(0),
        }
    }

    pub fn configuration(&self) -> &PipelineConfiguration {
        &self.config
    }

    /// Id handed to the most recent run, 0 before the first one.
    pub fn last_request_id(&self) -> u64 {
        self.request_id.load(Ordering::SeqCst)
    }

    /// Run the pipeline for `slots`.
    ///
    /// Every call consumes the next request id. An empty slot list returns
    /// right away without touching the init phase, so a page without
    /// matching slots never loads third-party scripts.
    pub async fn run(
        &self,
        slots: Vec<AdSlot>,
        config: Arc<StaticConfig>,
        runtime: Arc<RuntimeConfig>,
        request_ads_calls: u64,
    ) -> Result<(), PipelineError> {
        let request_id = self.request_id.fetch_add(1, Ordering::SeqCst) + 1;

        if slots.is_empty() {
            EmptyRequestSkipped { request_id }.log();
            return Ok(());
        }

        let started = PipelineRunStarted {
            request_id,
            slot_count: slots.len(),
        };
        started.log();
        let span = started.span("pipeline_run");

        let ctx = Arc::new(AdPipelineContext {
            request_id,
            request_ads_calls,
            config,
            runtime,
            render_events: self.render_events.clone(),
        });

        let start = Instant::now();
        let result = self.execute(ctx, Arc::new(slots)).instrument(span).await;

        match &result {
            Ok(()) => PipelineRunCompleted {
                request_id,
                duration: start.elapsed(),
            }
            .log(),
            Err(error) => PipelineRunFailed { request_id, error }.log(),
        }
        result
    }

    async fn execute(
        &self,
        ctx: Arc<AdPipelineContext>,
        slots: Arc<Vec<AdSlot>>,
    ) -> Result<(), PipelineError> {
        self.initialize().await?;
        self.run_configure(&ctx, &slots).await?;
        let definitions = Arc::new(self.run_define_slots(&ctx, &slots).await?);
        self.run_prepare_request_ads(&ctx, &definitions).await?;
        self.run_request_bids(&ctx, &definitions).await?;
        self.run_request_ads(&ctx, &definitions).await
    }

    /// Await the memoized init phase. Concurrent callers share one execution.
    async fn initialize(&self) -> Result<(), PipelineError> {
        self.init
            .get_or_init(|| Self::run_init_steps(&self.config))
            .await
            .clone()
    }

    async fn run_init_steps(config: &PipelineConfiguration) -> Result<(), PipelineError> {
        let start = Instant::now();
        let mut tasks = JoinSet::new();
        for step in &config.init {
            let step = step.clone();
            tasks.spawn(
                async move {
                    step.init()
                        .await
                        .map_err(|error| PipelineError::InitializationFailed {
                            step: step.name().to_string(),
                            error,
                        })
                }
                .in_current_span(),
            );
        }

        let result = settle_all(tasks).await;
        InitPhaseSettled {
            step_count: config.init.len(),
            duration: start.elapsed(),
            error: result.as_ref().err(),
        }
        .log();
        result
    }

    async fn run_configure(
        &self,
        ctx: &Arc<AdPipelineContext>,
        slots: &Arc<Vec<AdSlot>>,
    ) -> Result<(), PipelineError> {
        PhaseStarted {
            request_id: ctx.request_id,
            phase: Phase::Configure,
            step_count: self.config.configure.len(),
        }
        .log();

        let mut tasks = JoinSet::new();
        for step in &self.config.configure {
            let (step, ctx, slots) = (step.clone(), ctx.clone(), slots.clone());
            tasks.spawn(
                async move {
                    step.configure(&ctx, &slots)
                        .await
                        .map_err(|error| step_failed(Phase::Configure, step.name(), error))
                }
                .in_current_span(),
            );
        }
        settle_all(tasks).await
    }

    async fn run_define_slots(
        &self,
        ctx: &Arc<AdPipelineContext>,
        slots: &Arc<Vec<AdSlot>>,
    ) -> Result<Vec<SlotDefinition>, PipelineError> {
        PhaseStarted {
            request_id: ctx.request_id,
            phase: Phase::DefineSlots,
            step_count: 1,
        }
        .log();

        let step = &self.config.define_slots;
        step.define_slots(ctx, slots)
            .await
            .map_err(|error| step_failed(Phase::DefineSlots, step.name(), error))
    }

    async fn run_prepare_request_ads(
        &self,
        ctx: &Arc<AdPipelineContext>,
        definitions: &Arc<Vec<SlotDefinition>>,
    ) -> Result<(), PipelineError> {
        PhaseStarted {
            request_id: ctx.request_id,
            phase: Phase::PrepareRequestAds,
            step_count: self.config.prepare_request_ads.len(),
        }
        .log();

        for (priority, steps) in self.config.priority_tiers() {
            PrepareTierStarted {
                request_id: ctx.request_id,
                priority,
                step_count: steps.len(),
            }
            .log();

            let mut tasks = JoinSet::new();
            for step in steps {
                let (ctx, definitions) = (ctx.clone(), definitions.clone());
                tasks.spawn(
                    async move {
                        step.prepare(&ctx, &definitions)
                            .await
                            .map(|_| ())
                            .map_err(|error| {
                                step_failed(Phase::PrepareRequestAds, step.name(), error)
                            })
                    }
                    .in_current_span(),
                );
            }
            settle_all(tasks).await?;
        }
        Ok(())
    }

    async fn run_request_bids(
        &self,
        ctx: &Arc<AdPipelineContext>,
        definitions: &Arc<Vec<SlotDefinition>>,
    ) -> Result<(), PipelineError> {
        PhaseStarted {
            request_id: ctx.request_id,
            phase: Phase::RequestBids,
            step_count: self.config.request_bids.len(),
        }
        .log();

        let mut tasks = JoinSet::new();
        for step in &self.config.request_bids {
            let (step, ctx, definitions) = (step.clone(), ctx.clone(), definitions.clone());
            tasks.spawn(
                async move {
                    step.request_bids(&ctx, &definitions)
                        .await
                        .map_err(|error| step_failed(Phase::RequestBids, step.name(), error))
                }
                .in_current_span(),
            );
        }
        settle_all(tasks).await
    }

    async fn run_request_ads(
        &self,
        ctx: &Arc<AdPipelineContext>,
        definitions: &Arc<Vec<SlotDefinition>>,
    ) -> Result<(), PipelineError> {
        PhaseStarted {
            request_id: ctx.request_id,
            phase: Phase::RequestAds,
            step_count: 1,
        }
        .log();

        let step = &self.config.request_ads;
        step.request_ads(ctx, definitions)
            .await
            .map_err(|error| step_failed(Phase::RequestAds, step.name(), error))
    }
}

fn step_failed(phase: Phase, step: &str, error: StepError) -> PipelineError {
    StepFailed {
        phase,
        step,
        error: &error,
    }
    .log();
    PipelineError::StepFailed {
        phase,
        step: step.to_string(),
        error,
    }
}

/// Wait until every task settled successfully, or return the first failure.
///
/// On failure the remaining tasks are detached and keep running.
async fn settle_all(mut tasks: JoinSet<Result<(), PipelineError>>) -> Result<(), PipelineError> {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => continue,
            Ok(Err(error)) => {
                tasks.detach_all();
                return Err(error);
            }
            Err(join_error) => {
                tasks.detach_all();
                return Err(PipelineError::InternalError {
                    message: format!("Task join error: {}", join_error),
                });
            }
        }
    }
    Ok(())
}
