// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use thiserror::Error;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ol_config::ConfigError),
    #[error("module not found: {0}")]
    ModuleNotFound(String),
    #[error("module '{0}' is already loaded")]
    ModuleExists(String),
    #[error("source id '{id}' is already registered by module '{module}'")]
    DuplicateSourceId { id: String, module: String },
    #[error("source not found: {0}")]
    SourceNotFound(String),
    #[error("bus error: {0}")]
    Bus(#[from] ol_storage::BusError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] ol_storage::CheckpointError),
    #[error("registry error: {0}")]
    Registry(#[from] ol_storage::RegistryError),
    #[error("component init failed for {kind} '{id}': {message}")]
    ComponentInit {
        kind: &'static str,
        id: String,
        message: String,
    },
    #[error("runtime is stopped")]
    Stopped,
}
