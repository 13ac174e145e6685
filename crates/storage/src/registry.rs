// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted module registry.
//!
//! `<state_dir>/modules.json` maps filesystem directories to the modules
//! they own, so a control-API client can find the module for a project dir.
//! A new entry with the same `name` OR the same `sourceDir` replaces the
//! prior entry.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One registered module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub name: String,
    pub source_dir: PathBuf,
    pub config_path: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    modules: Vec<ModuleRecord>,
}

/// Registry file wrapper with replacement semantics.
pub struct ModuleRegistry {
    path: PathBuf,
    records: Mutex<Vec<ModuleRecord>>,
}

impl ModuleRegistry {
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        let records = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let file: RegistryFile = serde_json::from_str(&raw)?;
            file.modules
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    /// Insert a record, replacing any prior entry with the same name or
    /// the same source directory.
    pub fn upsert(&self, record: ModuleRecord) -> Result<(), RegistryError> {
        let snapshot = {
            let mut records = self.records.lock();
            records.retain(|r| r.name != record.name && r.source_dir != record.source_dir);
            records.push(record);
            records.clone()
        };
        self.persist(&snapshot)
    }

    pub fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let snapshot = {
            let mut records = self.records.lock();
            records.retain(|r| r.name != name);
            records.clone()
        };
        self.persist(&snapshot)
    }

    pub fn get(&self, name: &str) -> Option<ModuleRecord> {
        self.records.lock().iter().find(|r| r.name == name).cloned()
    }

    pub fn list(&self) -> Vec<ModuleRecord> {
        self.records.lock().clone()
    }

    fn persist(&self, records: &[ModuleRecord]) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = RegistryFile {
            modules: records.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file)?;

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&json)?;
            let _ = tmp.sync_all();
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
