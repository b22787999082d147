// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Step contracts consumed by the ad pipeline.
//!
//! Concrete implementations live with the ad-server, bidder and consent
//! integrations; the pipeline only sequences them.

use async_trait::async_trait;

use crate::config::AdSlot;
use crate::engine::{AdPipelineContext, SlotDefinition};
use crate::errors::StepError;

/// Loads or waits for a third-party dependency. Runs once per pipeline.
#[async_trait]
pub trait InitStep: Send + Sync {
    async fn init(&self) -> Result<(), StepError>;

    fn name(&self) -> &str;
}

/// Applies per-request configuration (targeting, consent, ...). Runs on every request.
#[async_trait]
pub trait ConfigureStep: Send + Sync {
    async fn configure(&self, ctx: &AdPipelineContext, slots: &[AdSlot]) -> Result<(), StepError>;

    fn name(&self) -> &str;
}

/// Materializes slots against the ad-serving API, dropping filtered ones.
#[async_trait]
pub trait DefineSlotsStep: Send + Sync {
    async fn define_slots(
        &self,
        ctx: &AdPipelineContext,
        slots: &[AdSlot],
    ) -> Result<Vec<SlotDefinition>, StepError>;

    fn name(&self) -> &str;
}

/// Prepares defined slots before bids are requested.
///
/// Steps sharing a priority run concurrently; a lower priority tier starts
/// only after every higher priority step has settled.
#[async_trait]
pub trait PrepareRequestAdsStep: Send + Sync {
    async fn prepare(
        &self,
        ctx: &AdPipelineContext,
        slots: &[SlotDefinition],
    ) -> Result<Vec<SlotDefinition>, StepError>;

    fn name(&self) -> &str;

    fn priority(&self) -> i32;
}

/// Requests bids for the defined slots.
#[async_trait]
pub trait RequestBidsStep: Send + Sync {
    async fn request_bids(
        &self,
        ctx: &AdPipelineContext,
        slots: &[SlotDefinition],
    ) -> Result<(), StepError>;

    fn name(&self) -> &str;
}

/// Issues the actual ad request / render call.
#[async_trait]
pub trait RequestAdsStep: Send + Sync {
    async fn request_ads(
        &self,
        ctx: &AdPipelineContext,
        slots: &[SlotDefinition],
    ) -> Result<(), StepError>;

    fn name(&self) -> &str;
}
