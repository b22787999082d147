// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{AdSlot, TargetingValue};
use crate::engine::{AdPipelineContext, AdServerSlot, SlotDefinition};
use crate::errors::StepError;
use crate::traits::{
    ConfigureStep, DefineSlotsStep, InitStep, PrepareRequestAdsStep, RequestAdsStep,
    RequestBidsStep,
};
use crate::utils::sync::lock;

/// Shared, ordered record of step completions, e.g. `"prepare:consent"`.
#[derive(Clone, Default)]
pub struct StepJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl StepJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }
}

/// Optional delay and failure shared by the recording steps.
#[derive(Clone, Default)]
struct Behaviour {
    delay: Option<Duration>,
    failure: Option<String>,
}

impl Behaviour {
    async fn run(&self) -> Result<(), StepError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(reason) => Err(StepError::failed(reason.clone())),
            None => Ok(()),
        }
    }
}

/// An init step that counts its executions
pub struct RecordingInitStep {
    name: String,
    journal: StepJournal,
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl RecordingInitStep {
    pub fn new(name: &str, journal: StepJournal) -> Self {
        Self {
            name: name.to_string(),
            journal,
            behaviour: Behaviour::default(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behaviour.delay = Some(delay);
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.behaviour.failure = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InitStep for RecordingInitStep {
    async fn init(&self) -> Result<(), StepError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.behaviour.run().await;
        self.journal.record(format!("init:{}", self.name));
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A configure step that records the request ids it was called with
pub struct RecordingConfigureStep {
    name: String,
    journal: StepJournal,
    behaviour: Behaviour,
    request_ids: Mutex<Vec<u64>>,
}

impl RecordingConfigureStep {
    pub fn new(name: &str, journal: StepJournal) -> Self {
        Self {
            name: name.to_string(),
            journal,
            behaviour: Behaviour::default(),
            request_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.behaviour.failure = Some(reason.to_string());
        self
    }

    pub fn request_ids(&self) -> Vec<u64> {
        lock(&self.request_ids).clone()
    }
}

#[async_trait]
impl ConfigureStep for RecordingConfigureStep {
    async fn configure(&self, ctx: &AdPipelineContext, _slots: &[AdSlot]) -> Result<(), StepError> {
        lock(&self.request_ids).push(ctx.request_id);
        let result = self.behaviour.run().await;
        self.journal.record(format!("configure:{}", self.name));
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Defines every slot that passes the label filter, resolving its ad unit path
pub struct PassThroughDefineSlots;

impl PassThroughDefineSlots {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DefineSlotsStep for PassThroughDefineSlots {
    async fn define_slots(
        &self,
        ctx: &AdPipelineContext,
        slots: &[AdSlot],
    ) -> Result<Vec<SlotDefinition>, StepError> {
        let filter = ctx.label_filter();
        Ok(slots
            .iter()
            .filter(|slot| filter.is_slot_available(slot))
            .map(|slot| {
                let ad_server_slot = AdServerSlot {
                    id: format!("gpt-{}", slot.dom_id),
                    ad_unit_path: ctx.resolve_ad_unit_path(&slot.ad_unit_path),
                };
                SlotDefinition::new(slot.clone(), ad_server_slot)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "pass-through"
    }
}

/// A prepare step that journals `prepare:{name}` when it completes
pub struct RecordingPrepareStep {
    name: String,
    priority: i32,
    journal: StepJournal,
    behaviour: Behaviour,
}

impl RecordingPrepareStep {
    pub fn new(name: &str, priority: i32, journal: StepJournal) -> Self {
        Self {
            name: name.to_string(),
            priority,
            journal,
            behaviour: Behaviour::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behaviour.delay = Some(delay);
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.behaviour.failure = Some(reason.to_string());
        self
    }
}

#[async_trait]
impl PrepareRequestAdsStep for RecordingPrepareStep {
    async fn prepare(
        &self,
        _ctx: &AdPipelineContext,
        slots: &[SlotDefinition],
    ) -> Result<Vec<SlotDefinition>, StepError> {
        self.behaviour.run().await?;
        self.journal.record(format!("prepare:{}", self.name));
        Ok(slots.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// A bid step that journals `bids:{name}`
pub struct RecordingRequestBids {
    name: String,
    journal: StepJournal,
    behaviour: Behaviour,
}

impl RecordingRequestBids {
    pub fn new(name: &str, journal: StepJournal) -> Self {
        Self {
            name: name.to_string(),
            journal,
            behaviour: Behaviour::default(),
        }
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.behaviour.failure = Some(reason.to_string());
        self
    }
}

#[async_trait]
impl RequestBidsStep for RecordingRequestBids {
    async fn request_bids(
        &self,
        _ctx: &AdPipelineContext,
        _slots: &[SlotDefinition],
    ) -> Result<(), StepError> {
        self.behaviour.run().await?;
        self.journal.record(format!("bids:{}", self.name));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Records every ad request: the dom ids and the key-values it was made with
pub struct RecordingRequestAds {
    behaviour: Behaviour,
    requests: Mutex<Vec<Vec<String>>>,
    key_values: Mutex<Vec<HashMap<String, TargetingValue>>>,
}

impl RecordingRequestAds {
    pub fn new() -> Self {
        Self {
            behaviour: Behaviour::default(),
            requests: Mutex::new(Vec::new()),
            key_values: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behaviour.delay = Some(delay);
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.behaviour.failure = Some(reason.to_string());
        self
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        lock(&self.requests).clone()
    }

    pub fn key_values(&self) -> Vec<HashMap<String, TargetingValue>> {
        lock(&self.key_values).clone()
    }
}

#[async_trait]
impl RequestAdsStep for RecordingRequestAds {
    async fn request_ads(
        &self,
        ctx: &AdPipelineContext,
        slots: &[SlotDefinition],
    ) -> Result<(), StepError> {
        lock(&self.requests).push(slots.iter().map(|slot| slot.dom_id().to_string()).collect());
        lock(&self.key_values).push(ctx.key_values());
        self.behaviour.run().await
    }

    fn name(&self) -> &str {
        "recording-request-ads"
    }
}
