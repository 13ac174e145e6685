// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-source checkpoint persistence.
//!
//! Each module owns one checkpoint file mapping source id → opaque cursor.
//! Entries are created on first poll and updated after every successful poll
//! that produced events. Writes are eager: temp file + atomic rename so a
//! crash never leaves a half-written file. Fsync is best-effort; losing the
//! last cursor costs a re-poll, not correctness.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Cursors at or before this moment are treated as "no checkpoint".
const EPOCH_CUTOFF_SECS: i64 = 86_400; // 1970-01-02T00:00:00Z

/// On-disk shape of the checkpoint file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointFile {
    checkpoints: BTreeMap<String, String>,
}

/// Per-module checkpoint store.
pub struct CheckpointStore {
    /// `None` keeps cursors in memory only (tests, ephemeral modules).
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl CheckpointStore {
    /// Open the store, loading any existing checkpoint file.
    pub fn open(path: &Path) -> Result<Self, CheckpointError> {
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let file: CheckpointFile = serde_json::from_str(&raw)?;
            file.checkpoints
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries: Mutex::new(entries),
        })
    }

    /// Store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Current cursor for a source, if one has ever been recorded.
    pub fn get(&self, source_id: &str) -> Option<String> {
        self.entries.lock().get(source_id).cloned()
    }

    /// Record a cursor and persist immediately.
    pub fn put(&self, source_id: &str, cursor: &str) -> Result<(), CheckpointError> {
        let snapshot = {
            let mut entries = self.entries.lock();
            entries.insert(source_id.to_string(), cursor.to_string());
            entries.clone()
        };
        self.persist(&snapshot)
    }

    /// Remove a source's cursor (module unload of a renamed source).
    pub fn remove(&self, source_id: &str) -> Result<(), CheckpointError> {
        let snapshot = {
            let mut entries = self.entries.lock();
            entries.remove(source_id);
            entries.clone()
        };
        self.persist(&snapshot)
    }

    /// All cursors (for status snapshots).
    pub fn all(&self) -> BTreeMap<String, String> {
        self.entries.lock().clone()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CheckpointError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = CheckpointFile {
            checkpoints: entries.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)?;

        // Temp + atomic rename; sync is best-effort
        let tmp_path = path.with_extension("tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&json)?;
            let _ = tmp.sync_all();
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// True when a cursor is the epoch sentinel (≤ 1970-01-02T00:00:00Z) and the
/// source should fall back to its initial lookback window.
pub fn is_epoch_checkpoint(cursor: &str) -> bool {
    match DateTime::parse_from_rfc3339(cursor) {
        Ok(ts) => ts.with_timezone(&Utc).timestamp() <= EPOCH_CUTOFF_SECS,
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
