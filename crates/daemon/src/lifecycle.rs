// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, discovery files, shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use ol_adapters::ConnectorRegistry;
use ol_config::load_module_config;
use ol_engine::{Runtime, RuntimeOptions};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/orgloop)
    pub state_dir: PathBuf,
    /// Path to pid file
    pub pid_path: PathBuf,
    /// Path to the listening-port discovery file
    pub port_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Requested listener port (0 = OS-assigned)
    pub port: u16,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Uses fixed paths under the state dir. One daemon serves all modules
    /// for a user.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;

        Ok(Self {
            pid_path: state_dir.join("orgloop.pid"),
            port_path: state_dir.join("runtime.port"),
            log_path: state_dir.join("daemon.log"),
            port: crate::env::port(),
            state_dir,
        })
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind 127.0.0.1:{0}: {1}")]
    BindFailed(u16, std::io::Error),

    #[error("Runtime error: {0}")]
    Runtime(#[from] ol_engine::RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub runtime: Arc<Runtime>,
    /// Port the listener actually bound (differs from config when 0).
    pub bound_port: u16,
}

impl DaemonState {
    /// Shutdown the daemon gracefully: stop the runtime, then remove the
    /// discovery files so clients stop finding us.
    pub async fn shutdown(&self) {
        info!("Shutting down daemon...");
        self.runtime.stop().await;

        for path in [&self.config.pid_path, &self.config.port_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), "Failed to remove discovery file: {}", e);
                }
            }
        }

        info!("Daemon shutdown complete");
    }
}

/// Result of daemon startup: the state plus the bound TCP listener to hand
/// to the HTTP server task.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: TcpListener,
}

/// Start the daemon: acquire the pid lock, build the runtime, reload
/// registered modules, bind the listener, and write the discovery files.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock —
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire lock file FIRST - prevents races.
    // Open without truncating so a failed lock doesn't wipe the running
    // daemon's pid.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.pid_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID now that we hold the lock
    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Drop mutability

    // Build the runtime with the built-in connector registry
    let mut options = RuntimeOptions {
        state_dir: Some(config.state_dir.clone()),
        ..RuntimeOptions::default()
    };
    if let Some(drain) = crate::env::drain_window() {
        options.drain_window = drain;
    }
    let runtime = Arc::new(Runtime::new(ConnectorRegistry::builtin(), options)?);

    // Reload modules registered by a prior run
    reload_registered_modules(&runtime).await;

    // Bind LAST - only after all validation passes
    let listener = TcpListener::bind(("127.0.0.1", config.port))
        .await
        .map_err(|e| LifecycleError::BindFailed(config.port, e))?;
    let bound_port = listener
        .local_addr()
        .map(|a| a.port())
        .unwrap_or(config.port);

    // Discovery: clients read the pid and port files and check liveness
    std::fs::write(&config.port_path, format!("{bound_port}\n"))?;

    info!(port = bound_port, "Daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            runtime,
            bound_port,
        },
        listener,
    })
}

/// Best-effort reload of every module in the registry file. A module whose
/// config no longer loads is dropped from the registry with a warning.
async fn reload_registered_modules(runtime: &Arc<Runtime>) {
    let records = match runtime.module_registry() {
        Some(registry) => registry.list(),
        None => return,
    };

    for record in records {
        match load_module_config(&record.config_path) {
            Ok(config) => match runtime.load_module(config).await {
                Ok(summary) => {
                    info!(module = %summary.name, state = %summary.state, "module reloaded")
                }
                Err(e) => warn!(module = %record.name, error = %e, "module reload failed"),
            },
            Err(e) => {
                warn!(
                    module = %record.name,
                    path = %record.config_path.display(),
                    error = %e,
                    "config no longer loads, dropping registry entry"
                );
                if let Some(registry) = runtime.module_registry() {
                    let _ = registry.remove(&record.name);
                }
            }
        }
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [&config.pid_path, &config.port_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
