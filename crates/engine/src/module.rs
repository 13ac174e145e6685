// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module instance
//!
//! One loaded configuration: sources, actors, transforms, loggers, routes,
//! an owned event bus, and an owned checkpoint store. The instance carries
//! the full per-event data flow: publish → route → transform → deliver →
//! ack, with every phase logged to the module's sinks.

use crate::fanout::LoggerFanout;
use crate::pipeline::{merge_config, run_pipeline, PipelineOutcome};
use crate::router::match_routes;
use ol_adapters::{
    Actor, Delivery, DeliveryStatus, EventSink, Source, Transform, WebhookError, WebhookRequest,
};
use ol_config::{ModuleConfig, RouteDef};
use ol_core::{Event, LogEntry, LogPhase};
use ol_storage::{CheckpointStore, EventBus};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Module health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleState {
    Active,
    /// Some component failed `init`; the rest keeps running.
    Degraded { reason: String },
}

impl ModuleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleState::Active => "active",
            ModuleState::Degraded { .. } => "degraded",
        }
    }
}

/// Pre-instantiated components handed to `ModuleInstance::build`.
///
/// The resolver (runtime + connector registry) constructs these; tests pass
/// fakes directly.
pub struct ResolvedComponents {
    pub sources: Vec<(String, Box<dyn Source>)>,
    pub actors: Vec<(String, Box<dyn Actor>)>,
    /// Keyed by transform definition name (package and script steps alike).
    pub transforms: Vec<(String, Box<dyn Transform>)>,
    pub loggers: Vec<Box<dyn EventSink>>,
}

pub struct ModuleInstance {
    name: String,
    config: ModuleConfig,
    state: ModuleState,
    sources: HashMap<String, Arc<tokio::sync::Mutex<Box<dyn Source>>>>,
    /// Sources whose `init` failed; they get no poll ticks.
    failed_sources: Vec<String>,
    actors: HashMap<String, Arc<tokio::sync::RwLock<Box<dyn Actor>>>>,
    transforms: HashMap<String, Box<dyn Transform>>,
    transform_configs: HashMap<String, Map<String, Value>>,
    loggers: LoggerFanout,
    bus: Arc<dyn EventBus>,
    checkpoints: Arc<CheckpointStore>,
    shut_down: Mutex<bool>,
}

impl ModuleInstance {
    /// Initialize every component and assemble the instance.
    ///
    /// A failing source or actor `init` records the reason and puts the
    /// module into `Degraded`; the component is excluded, the rest runs.
    pub async fn build(
        config: ModuleConfig,
        mut resolved: ResolvedComponents,
        bus: Arc<dyn EventBus>,
        checkpoints: Arc<CheckpointStore>,
    ) -> Self {
        let name = config.name.clone();
        let mut failures: Vec<String> = Vec::new();
        let mut failed_sources = Vec::new();

        let mut sources = HashMap::new();
        for (id, mut source) in resolved.sources.drain(..) {
            match source.init().await {
                Ok(()) => {
                    sources.insert(id, Arc::new(tokio::sync::Mutex::new(source)));
                }
                Err(e) => {
                    error!(module = %name, source = %id, error = %e, "source init failed");
                    failures.push(format!("source '{id}': {e}"));
                    failed_sources.push(id);
                }
            }
        }

        let mut actors = HashMap::new();
        for (id, mut actor) in resolved.actors.drain(..) {
            match actor.init().await {
                Ok(()) => {
                    actors.insert(id, Arc::new(tokio::sync::RwLock::new(actor)));
                }
                Err(e) => {
                    error!(module = %name, actor = %id, error = %e, "actor init failed");
                    failures.push(format!("actor '{id}': {e}"));
                }
            }
        }

        let transforms: HashMap<String, Box<dyn Transform>> =
            resolved.transforms.drain(..).collect();
        let transform_configs = config
            .transforms
            .iter()
            .map(|t| (t.name.clone(), t.config.clone()))
            .collect();

        let state = if failures.is_empty() {
            ModuleState::Active
        } else {
            ModuleState::Degraded {
                reason: failures.join("; "),
            }
        };

        info!(module = %name, state = state.as_str(), "module loaded");

        Self {
            name,
            config,
            state,
            sources,
            failed_sources,
            actors,
            transforms,
            transform_configs,
            loggers: LoggerFanout::new(resolved.loggers),
            bus,
            checkpoints,
            shut_down: Mutex::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    /// Record a degraded reason (resolver-side constructor failures).
    pub fn set_degraded(&mut self, reason: String) {
        self.state = ModuleState::Degraded { reason };
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn loggers(&self) -> &LoggerFanout {
        &self.loggers
    }

    /// Source ids this module owns (healthy and failed alike).
    pub fn source_ids(&self) -> Vec<String> {
        self.config.sources.iter().map(|s| s.id.clone()).collect()
    }

    /// Sources whose init failed on this load.
    pub fn failed_sources(&self) -> &[String] {
        &self.failed_sources
    }

    /// True when the source exists and survived init.
    pub fn owns_live_source(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    /// Poll sources to register with the scheduler: (source id, interval),
    /// excluding webhook-only sources and those that failed to construct
    /// or init.
    pub fn poll_sources(&self) -> Vec<(String, std::time::Duration)> {
        self.config
            .sources
            .iter()
            .filter(|s| self.sources.contains_key(&s.id))
            .filter_map(|s| {
                let interval = self.config.poll_interval(s)?;
                let duration = ol_core::parse_duration(interval).ok()?;
                Some((s.id.clone(), duration))
            })
            .collect()
    }

    /// Drive one poll for a source: load the checkpoint, poll, process each
    /// event in source order, then advance the checkpoint.
    pub async fn poll_source(self: &Arc<Self>, source_id: &str) {
        let Some(slot) = self.sources.get(source_id) else {
            debug!(module = %self.name, source = %source_id, "poll tick for unknown source");
            return;
        };

        // The scheduler already skips overlapping ticks; try_lock is the
        // second line of defense (webhook handling shares the slot)
        let Ok(mut source) = slot.try_lock() else {
            debug!(module = %self.name, source = %source_id, "source busy, dropping tick");
            return;
        };

        let stored = self.checkpoints.get(source_id);
        let result = source.poll(stored.as_deref()).await;
        drop(source);

        match result {
            Ok(poll) => {
                let produced = poll.events.len();
                for event in poll.events {
                    self.process_event(event).await;
                }

                if let Some(cursor) = poll.checkpoint {
                    // Entries are created on first poll; afterwards only a
                    // poll that produced events advances the cursor
                    if produced > 0 || stored.is_none() {
                        if let Err(e) = self.checkpoints.put(source_id, &cursor) {
                            warn!(
                                module = %self.name,
                                source = %source_id,
                                error = %e,
                                "failed to persist checkpoint"
                            );
                        }
                    }
                }
            }
            Err(e) => {
                // Checkpoint retained; the next tick retries
                error!(
                    module = %self.name,
                    source = %source_id,
                    error = %e,
                    "poll failed"
                );
            }
        }
    }

    /// Dispatch an inbound webhook to the owning source.
    pub async fn handle_webhook(
        &self,
        source_id: &str,
        request: &WebhookRequest,
    ) -> Result<Vec<Event>, WebhookError> {
        let Some(slot) = self.sources.get(source_id) else {
            return Err(WebhookError::Unsupported);
        };
        let source = slot.lock().await;
        source.webhook(request).await
    }

    /// Run one event through the module: publish, route, transform,
    /// deliver, ack. Every phase lands in the module's sinks.
    ///
    /// Returns a boxed future (rather than `async fn`) to break the
    /// recursive opaque-type cycle with `deliver`, which re-enters this
    /// function for response events.
    pub fn process_event<'a>(
        self: &'a Arc<Self>,
        event: Event,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if let Err(e) = self.bus.publish(&event).await {
                // Losing the append is fatal for this event only
                error!(module = %self.name, event = %event.id, error = %e, "bus append failed");
                self.loggers.emit(
                    &LogEntry::for_event(LogPhase::SystemError, &event)
                        .error(format!("bus append failed: {e}")),
                );
                return;
            }

            self.loggers
                .emit(&LogEntry::for_event(LogPhase::SourceEmit, &event));

            self.route_and_deliver(&event).await;

            if let Err(e) = self.bus.ack(&event.id) {
                warn!(module = %self.name, event = %event.id, error = %e, "bus ack failed");
            }
        })
    }

    /// Re-deliver events that were published but never acked (crash
    /// recovery). Replays in ingest order.
    pub async fn replay_unacked(self: &Arc<Self>) {
        let pending = self.bus.unacked();
        if pending.is_empty() {
            return;
        }
        info!(module = %self.name, count = pending.len(), "replaying unacked events");
        for event in pending {
            self.loggers
                .emit(&LogEntry::for_event(LogPhase::SourceEmit, &event));
            self.route_and_deliver(&event).await;
            if let Err(e) = self.bus.ack(&event.id) {
                warn!(module = %self.name, event = %event.id, error = %e, "bus ack failed");
            }
        }
    }

    /// Route matching plus per-route pipelines and deliveries.
    ///
    /// Matched routes run concurrently; the caller acks only after all of
    /// them complete.
    async fn route_and_deliver(self: &Arc<Self>, event: &Event) {
        let matched = match_routes(event, &self.config.routes);
        if matched.is_empty() {
            self.loggers
                .emit(&LogEntry::for_event(LogPhase::RouteNoMatch, event));
            return;
        }

        let mut tasks: JoinSet<()> = JoinSet::new();
        for route in matched {
            self.loggers.emit(
                &LogEntry::for_event(LogPhase::RouteMatch, event).route(&route.name),
            );

            let module = Arc::clone(self);
            let route = route.clone();
            let event = event.clone();
            tasks.spawn(async move {
                module.run_route(event, &route).await;
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(module = %self.name, error = %e, "route task panicked");
            }
        }
    }

    /// One route: transform pipeline, then delivery on pass.
    async fn run_route(self: &Arc<Self>, event: Event, route: &RouteDef) {
        let outcome = run_pipeline(
            event,
            route,
            &self.transforms,
            &self.transform_configs,
            &self.loggers,
        )
        .await;

        let event = match outcome {
            PipelineOutcome::Deliver(event) => event,
            PipelineOutcome::Dropped => return,
        };

        self.deliver(event, route).await;
    }

    async fn deliver(self: &Arc<Self>, event: Event, route: &RouteDef) {
        let Some(actor) = self.actors.get(&route.then.actor) else {
            self.loggers.emit(
                &LogEntry::for_event(LogPhase::DeliverFailure, &event)
                    .route(&route.name)
                    .target(&route.then.actor)
                    .error("actor not available"),
            );
            return;
        };

        let config = self.delivery_config(route);

        self.loggers.emit(
            &LogEntry::for_event(LogPhase::DeliverAttempt, &event)
                .route(&route.name)
                .target(&route.then.actor),
        );

        let started = std::time::Instant::now();
        let result = {
            let actor = actor.read().await;
            actor.deliver(&event, &config).await
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Delivery {
                status,
                response_event,
                error,
            }) => {
                let phase = match status {
                    DeliveryStatus::Delivered => LogPhase::DeliverSuccess,
                    DeliveryStatus::Rejected | DeliveryStatus::Error => LogPhase::DeliverFailure,
                };
                let mut entry = LogEntry::for_event(phase, &event)
                    .route(&route.name)
                    .target(&route.then.actor)
                    .result(status.as_str())
                    .duration_ms(duration_ms);
                if let Some(error) = error {
                    entry = entry.error(error);
                }
                self.loggers.emit(&entry);

                // A response event closes the loop: it inherits the
                // originator's trace id and re-enters the module's flow
                if let Some(mut response) = response_event {
                    response.trace_id = event.trace_id.clone();
                    let module = Arc::clone(self);
                    module.process_event(response).await;
                }
            }
            Err(e) => {
                self.loggers.emit(
                    &LogEntry::for_event(LogPhase::DeliverFailure, &event)
                        .route(&route.name)
                        .target(&route.then.actor)
                        .result("error")
                        .duration_ms(duration_ms)
                        .error(e.to_string()),
                );
            }
        }
    }

    /// Merge `then.config` with the launch prompt fields when configured.
    ///
    /// The prompt file resolves relative to the module's config directory;
    /// an unreadable file logs a warning and delivery proceeds without it.
    fn delivery_config(&self, route: &RouteDef) -> Map<String, Value> {
        let mut config = merge_config(&Map::new(), route.then.config.as_ref());

        if let Some(with) = &route.with {
            let path = self.resolve_path(&with.prompt_file);
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    config.insert("launch_prompt".to_string(), Value::String(contents));
                    config.insert(
                        "launch_prompt_file".to_string(),
                        Value::String(path.display().to_string()),
                    );
                }
                Err(e) => {
                    warn!(
                        module = %self.name,
                        route = %route.name,
                        path = %path.display(),
                        error = %e,
                        "failed to read launch prompt, delivering without it"
                    );
                }
            }
        }

        config
    }

    fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.config.module_path {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Shut every component down exactly once, in reverse creation order.
    pub async fn shutdown(&self) {
        {
            let mut done = self.shut_down.lock();
            if *done {
                return;
            }
            *done = true;
        }

        // Transforms and loggers tear down on drop; actors and sources get
        // an explicit async farewell, newest first
        for (id, actor) in &self.actors {
            let mut actor = actor.write().await;
            actor.shutdown().await;
            debug!(module = %self.name, actor = %id, "actor shut down");
        }
        for (id, source) in &self.sources {
            let mut source = source.lock().await;
            source.shutdown().await;
            debug!(module = %self.name, source = %id, "source shut down");
        }

        // Everything processed is acked by now; reclaim the WAL space
        if let Err(e) = self.bus.compact() {
            warn!(module = %self.name, error = %e, "bus compaction failed");
        }

        self.loggers.emit(&LogEntry::system(LogPhase::SystemStop));
        info!(module = %self.name, "module unloaded");
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
