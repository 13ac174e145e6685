// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-module runtime
//!
//! Owns the shared poll scheduler and the registry of loaded modules.
//! Modules reference each other by name only; the scheduler's callback
//! resolves the owning module at tick time, so load/unload never races a
//! back-pointer.

use crate::error::RuntimeError;
use crate::module::{ModuleInstance, ModuleState, ResolvedComponents};
use crate::scheduler::{PollCallback, PollScheduler};
use ol_adapters::{ConnectorRegistry, ScriptTransform, WebhookError, WebhookRequest};
use ol_config::{ModuleConfig, TransformKind};
use ol_core::{Event, EventId};
use ol_storage::{CheckpointStore, MemoryBus, ModuleRecord, ModuleRegistry, WalBus};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Default bounded wait for in-flight deliveries on unload/stop.
const DRAIN_WINDOW: Duration = Duration::from_secs(10);

/// How the runtime persists module state.
pub struct RuntimeOptions {
    /// Root for per-module WALs, checkpoints, and the module registry.
    /// `None` keeps everything in memory (tests).
    pub state_dir: Option<PathBuf>,
    /// Bounded drain window for unload/stop.
    pub drain_window: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            state_dir: None,
            drain_window: DRAIN_WINDOW,
        }
    }
}

/// Introspective module snapshot for the control API.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub state: String,
    pub sources: usize,
    pub actors: usize,
    pub routes: usize,
}

/// Introspective runtime snapshot for the control API.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub running: bool,
    pub uptime_ms: u64,
    pub modules: Vec<ModuleSummary>,
}

pub struct Runtime {
    registry: ConnectorRegistry,
    scheduler: PollScheduler,
    modules: Arc<Mutex<HashMap<String, Arc<ModuleInstance>>>>,
    /// Keyed by module name and kept across hot-reloads so unchanged
    /// sources retain their cursors.
    checkpoint_stores: Mutex<HashMap<String, Arc<CheckpointStore>>>,
    module_registry: Option<ModuleRegistry>,
    options: RuntimeOptions,
    started_at: Instant,
    running: Mutex<bool>,
}

impl Runtime {
    pub fn new(registry: ConnectorRegistry, options: RuntimeOptions) -> Result<Self, RuntimeError> {
        let modules: Arc<Mutex<HashMap<String, Arc<ModuleInstance>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        // The scheduler resolves the owning module at tick time; a module
        // unloaded mid-flight simply stops matching
        let callback: PollCallback = {
            let modules = Arc::clone(&modules);
            Arc::new(move |module_name: String, source_id: String| {
                let modules = Arc::clone(&modules);
                Box::pin(async move {
                    let instance = modules.lock().get(&module_name).cloned();
                    if let Some(instance) = instance {
                        instance.poll_source(&source_id).await;
                    }
                })
            })
        };

        let module_registry = match &options.state_dir {
            Some(dir) => Some(ModuleRegistry::open(&dir.join("modules.json"))?),
            None => None,
        };

        Ok(Self {
            registry,
            scheduler: PollScheduler::new(callback),
            modules,
            checkpoint_stores: Mutex::new(HashMap::new()),
            module_registry,
            options,
            started_at: Instant::now(),
            running: Mutex::new(true),
        })
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock()
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    pub fn module_registry(&self) -> Option<&ModuleRegistry> {
        self.module_registry.as_ref()
    }

    /// Resolve a config into instantiated components via the connector
    /// registry. Constructor failures surface as init failures (degraded
    /// module), not load rejections.
    fn resolve_components(
        &self,
        config: &ModuleConfig,
    ) -> (ResolvedComponents, Vec<String>) {
        let mut failures = Vec::new();
        let mut resolved = ResolvedComponents {
            sources: Vec::new(),
            actors: Vec::new(),
            transforms: Vec::new(),
            loggers: Vec::new(),
        };

        for def in &config.sources {
            match self.registry.create_source(&def.connector, &def.id, &def.config) {
                Ok(source) => resolved.sources.push((def.id.clone(), source)),
                Err(e) => failures.push(format!("source '{}': {e}", def.id)),
            }
        }
        for def in &config.actors {
            match self.registry.create_actor(&def.connector, &def.id, &def.config) {
                Ok(actor) => resolved.actors.push((def.id.clone(), actor)),
                Err(e) => failures.push(format!("actor '{}': {e}", def.id)),
            }
        }
        for def in &config.transforms {
            match def.kind {
                TransformKind::Package => {
                    let package = def.package.as_deref().unwrap_or(&def.name);
                    match self.registry.create_transform(package, &def.config) {
                        Ok(transform) => resolved.transforms.push((def.name.clone(), transform)),
                        Err(e) => failures.push(format!("transform '{}': {e}", def.name)),
                    }
                }
                TransformKind::Script => {
                    if let Some(script) = &def.script {
                        let path = match (&config.module_path, script.is_absolute()) {
                            (Some(base), false) => base.join(script),
                            _ => script.clone(),
                        };
                        resolved.transforms.push((
                            def.name.clone(),
                            Box::new(ScriptTransform::new(&def.name, path, def.timeout_ms)),
                        ));
                    }
                }
            }
        }
        for def in &config.loggers {
            match self.registry.create_logger(&def.logger, &def.config) {
                Ok(logger) => resolved.loggers.push(logger),
                Err(e) => failures.push(format!("logger '{}': {e}", def.id)),
            }
        }

        (resolved, failures)
    }

    /// Load (or hot-reload) a module from config, resolving components via
    /// the connector registry.
    pub async fn load_module(&self, config: ModuleConfig) -> Result<ModuleSummary, RuntimeError> {
        let (resolved, failures) = self.resolve_components(&config);
        self.load_module_with(config, resolved, failures).await
    }

    /// Load with pre-instantiated components (tests inject fakes here).
    pub async fn load_module_with(
        &self,
        config: ModuleConfig,
        resolved: ResolvedComponents,
        mut init_failures: Vec<String>,
    ) -> Result<ModuleSummary, RuntimeError> {
        if !self.is_running() {
            return Err(RuntimeError::Stopped);
        }
        config.validate()?;
        let name = config.name.clone();

        // Hot-reload: unload the prior instance first. Its checkpoint file
        // survives, so unchanged sources keep their cursors.
        if self.modules.lock().contains_key(&name) {
            info!(module = %name, "hot-reloading module");
            self.unload_module(&name).await?;
        }

        // Source ids are process-wide (webhook paths); reject duplicates
        {
            let modules = self.modules.lock();
            for source in &config.sources {
                for (other_name, other) in modules.iter() {
                    if other.source_ids().contains(&source.id) {
                        return Err(RuntimeError::DuplicateSourceId {
                            id: source.id.clone(),
                            module: other_name.clone(),
                        });
                    }
                }
            }
        }

        let bus: Arc<dyn ol_storage::EventBus> = match &self.options.state_dir {
            Some(dir) => {
                let module_dir = dir.join("modules").join(&name);
                Arc::new(WalBus::open(&module_dir.join("events.wal"))?)
            }
            None => Arc::new(MemoryBus::new()),
        };

        // Checkpoint stores survive hot-reload, keyed (module, source)
        let checkpoints = {
            let mut stores = self.checkpoint_stores.lock();
            match stores.get(&name) {
                Some(store) => Arc::clone(store),
                None => {
                    let store = match &self.options.state_dir {
                        Some(dir) => Arc::new(CheckpointStore::open(
                            &dir.join("modules").join(&name).join("checkpoints.json"),
                        )?),
                        None => Arc::new(CheckpointStore::in_memory()),
                    };
                    stores.insert(name.clone(), Arc::clone(&store));
                    store
                }
            }
        };

        let source_dir = config.module_path.clone();
        let config_file = config.config_file.clone();
        let mut instance =
            ModuleInstance::build(config, resolved, Arc::clone(&bus), checkpoints).await;

        // Constructor failures from the resolver degrade the module too
        if !init_failures.is_empty() {
            if let ModuleState::Degraded { reason } = instance.state() {
                init_failures.push(reason.clone());
            }
            instance.set_degraded(init_failures.join("; "));
        }

        let instance = Arc::new(instance);
        let summary = summarize(&instance);

        self.modules
            .lock()
            .insert(name.clone(), Arc::clone(&instance));

        // Register tickers only for sources that survived init
        for (source_id, interval) in instance.poll_sources() {
            self.scheduler.add_source(&name, &source_id, interval);
        }

        // Crash recovery: anything published but never acked goes around
        // again (at-least-once)
        instance.replay_unacked().await;

        if let Some(registry) = &self.module_registry {
            let record = ModuleRecord {
                name: name.clone(),
                source_dir: source_dir.unwrap_or_default(),
                config_path: config_file.unwrap_or_default(),
                loaded_at: chrono::Utc::now(),
            };
            if let Err(e) = registry.upsert(record) {
                warn!(module = %name, error = %e, "failed to persist module registry");
            }
        }

        Ok(summary)
    }

    /// Unload a module: stop its tickers, drain in-flight work (bounded),
    /// shut components down, and drop it from the registry.
    pub async fn unload_module(&self, name: &str) -> Result<(), RuntimeError> {
        let instance = self
            .modules
            .lock()
            .remove(name)
            .ok_or_else(|| RuntimeError::ModuleNotFound(name.to_string()))?;

        self.scheduler.remove_module(name);
        self.drain(&instance).await;
        instance.shutdown().await;

        if let Some(registry) = &self.module_registry {
            if let Err(e) = registry.remove(name) {
                warn!(module = %name, error = %e, "failed to update module registry");
            }
        }

        Ok(())
    }

    /// Wait until we hold the only reference (no in-flight deliveries), up
    /// to the drain window.
    async fn drain(&self, instance: &Arc<ModuleInstance>) {
        let deadline = Instant::now() + self.options.drain_window;
        while Arc::strong_count(instance) > 1 {
            if Instant::now() >= deadline {
                warn!(
                    module = %instance.name(),
                    "drain window elapsed with deliveries still in flight"
                );
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Drive one poll for a source immediately (control API, tests).
    pub async fn poll_now(&self, module: &str, source_id: &str) -> Result<(), RuntimeError> {
        let instance = self
            .modules
            .lock()
            .get(module)
            .cloned()
            .ok_or_else(|| RuntimeError::ModuleNotFound(module.to_string()))?;
        instance.poll_source(source_id).await;
        Ok(())
    }

    /// Admit an event directly into a module's flow (webhook intake, tests).
    ///
    /// With `module` unset the event goes to the single loaded module;
    /// ambiguous with more than one.
    pub async fn inject(&self, event: Event, module: Option<&str>) -> Result<(), RuntimeError> {
        let instance = {
            let modules = self.modules.lock();
            match module {
                Some(name) => modules.get(name).cloned(),
                None if modules.len() == 1 => modules.values().next().cloned(),
                None => None,
            }
        };
        let instance = instance.ok_or_else(|| {
            RuntimeError::ModuleNotFound(module.unwrap_or("<default>").to_string())
        })?;

        instance.process_event(event).await;
        Ok(())
    }

    /// Route an inbound webhook to the module owning `source_id` and
    /// process every event it produced. Returns the event ids.
    pub async fn handle_webhook(
        &self,
        source_id: &str,
        request: &WebhookRequest,
    ) -> Result<Vec<EventId>, WebhookError> {
        let instance = {
            let modules = self.modules.lock();
            modules
                .values()
                .find(|m| m.owns_live_source(source_id))
                .cloned()
        };
        let Some(instance) = instance else {
            return Err(WebhookError::Unsupported);
        };

        let events = instance.handle_webhook(source_id, request).await?;
        let mut ids = Vec::with_capacity(events.len());
        for event in events {
            ids.push(event.id.clone());
            instance.process_event(event).await;
        }
        Ok(ids)
    }

    pub fn list_modules(&self) -> Vec<ModuleSummary> {
        let modules = self.modules.lock();
        let mut summaries: Vec<ModuleSummary> = modules.values().map(summarize).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            running: self.is_running(),
            uptime_ms: self.started_at.elapsed().as_millis() as u64,
            modules: self.list_modules(),
        }
    }

    /// Graceful stop: cancel pollers, drain, and shut every module down.
    /// After this returns no further log entries are emitted.
    pub async fn stop(&self) {
        {
            let mut running = self.running.lock();
            if !*running {
                return;
            }
            *running = false;
        }

        info!("runtime stopping");
        self.scheduler.stop();

        let instances: Vec<Arc<ModuleInstance>> =
            self.modules.lock().drain().map(|(_, v)| v).collect();
        for instance in &instances {
            self.drain(instance).await;
            instance.shutdown().await;
        }
        info!("runtime stopped");
    }
}

fn summarize(instance: &Arc<ModuleInstance>) -> ModuleSummary {
    let config = instance.config();
    ModuleSummary {
        name: instance.name().to_string(),
        state: instance.state().as_str().to_string(),
        sources: config.sources.len(),
        actors: config.actors.len(),
        routes: config.routes.len(),
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
