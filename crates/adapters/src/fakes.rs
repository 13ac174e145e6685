// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapters for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::actor::{Actor, ActorError, Delivery};
use crate::connector::{PollResult, Source, SourceError, WebhookError, WebhookRequest};
use crate::logger::EventSink;
use async_trait::async_trait;
use ol_core::{Event, LogEntry, LogPhase};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;

// =============================================================================
// FakeSource
// =============================================================================

#[derive(Default)]
struct FakeSourceState {
    batches: VecDeque<Result<Vec<Event>, SourceError>>,
    webhook_events: VecDeque<Vec<Event>>,
    checkpoints_seen: Vec<Option<String>>,
    polls: u32,
    init_calls: u32,
    shutdown_calls: u32,
    fail_init: Option<String>,
}

/// Scripted source. Clone the handle to keep inspecting it after the engine
/// takes ownership of the boxed trait object.
#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<FakeSourceState>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one poll's worth of events.
    pub fn push_batch(&self, events: Vec<Event>) {
        self.state.lock().batches.push_back(Ok(events));
    }

    pub fn push_error(&self, error: SourceError) {
        self.state.lock().batches.push_back(Err(error));
    }

    /// Queue events for the next webhook call.
    pub fn push_webhook_events(&self, events: Vec<Event>) {
        self.state.lock().webhook_events.push_back(events);
    }

    pub fn fail_init(&self, message: &str) {
        self.state.lock().fail_init = Some(message.to_string());
    }

    pub fn polls(&self) -> u32 {
        self.state.lock().polls
    }

    pub fn checkpoints_seen(&self) -> Vec<Option<String>> {
        self.state.lock().checkpoints_seen.clone()
    }

    pub fn init_calls(&self) -> u32 {
        self.state.lock().init_calls
    }

    pub fn shutdown_calls(&self) -> u32 {
        self.state.lock().shutdown_calls
    }
}

#[async_trait]
impl Source for FakeSource {
    async fn init(&mut self) -> Result<(), SourceError> {
        let mut state = self.state.lock();
        state.init_calls += 1;
        match &state.fail_init {
            Some(message) => Err(SourceError::Init(message.clone())),
            None => Ok(()),
        }
    }

    async fn poll(&mut self, checkpoint: Option<&str>) -> Result<PollResult, SourceError> {
        let mut state = self.state.lock();
        state.polls += 1;
        state
            .checkpoints_seen
            .push(checkpoint.map(|s| s.to_string()));

        match state.batches.pop_front() {
            Some(Ok(events)) => {
                let checkpoint = events
                    .iter()
                    .map(|e| e.timestamp)
                    .max()
                    .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
                Ok(PollResult { events, checkpoint })
            }
            Some(Err(error)) => Err(error),
            None => Ok(PollResult::default()),
        }
    }

    async fn webhook(&self, _request: &WebhookRequest) -> Result<Vec<Event>, WebhookError> {
        let mut state = self.state.lock();
        match state.webhook_events.pop_front() {
            Some(events) => Ok(events),
            None => Err(WebhookError::InvalidPayload("no scripted events".to_string())),
        }
    }

    async fn shutdown(&mut self) {
        self.state.lock().shutdown_calls += 1;
    }
}

// =============================================================================
// FakeActor
// =============================================================================

/// One recorded delivery.
#[derive(Debug, Clone)]
pub struct DeliveredCall {
    pub event: Event,
    pub config: Map<String, Value>,
}

#[derive(Default)]
struct FakeActorState {
    delivered: Vec<DeliveredCall>,
    responses: VecDeque<Delivery>,
    init_calls: u32,
    shutdown_calls: u32,
    fail_init: Option<String>,
}

/// Recording actor with scriptable outcomes (default: delivered).
#[derive(Clone, Default)]
pub struct FakeActor {
    state: Arc<Mutex<FakeActorState>>,
}

impl FakeActor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, delivery: Delivery) {
        self.state.lock().responses.push_back(delivery);
    }

    pub fn fail_init(&self, message: &str) {
        self.state.lock().fail_init = Some(message.to_string());
    }

    pub fn delivered(&self) -> Vec<DeliveredCall> {
        self.state.lock().delivered.clone()
    }

    pub fn delivered_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .delivered
            .iter()
            .map(|c| c.event.id.to_string())
            .collect()
    }

    pub fn init_calls(&self) -> u32 {
        self.state.lock().init_calls
    }

    pub fn shutdown_calls(&self) -> u32 {
        self.state.lock().shutdown_calls
    }
}

#[async_trait]
impl Actor for FakeActor {
    async fn init(&mut self) -> Result<(), ActorError> {
        let mut state = self.state.lock();
        state.init_calls += 1;
        match &state.fail_init {
            Some(message) => Err(ActorError::Init(message.clone())),
            None => Ok(()),
        }
    }

    async fn deliver(
        &self,
        event: &Event,
        route_config: &Map<String, Value>,
    ) -> Result<Delivery, ActorError> {
        let mut state = self.state.lock();
        state.delivered.push(DeliveredCall {
            event: event.clone(),
            config: route_config.clone(),
        });
        Ok(state.responses.pop_front().unwrap_or_else(Delivery::delivered))
    }

    async fn shutdown(&mut self) {
        self.state.lock().shutdown_calls += 1;
    }
}

// =============================================================================
// RecordingSink
// =============================================================================

/// Captures every log entry for assertions.
#[derive(Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn phases(&self) -> Vec<LogPhase> {
        self.entries.lock().iter().map(|e| e.phase).collect()
    }

    /// Entries with the given phase.
    pub fn with_phase(&self, phase: LogPhase) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.phase == phase)
            .cloned()
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}
