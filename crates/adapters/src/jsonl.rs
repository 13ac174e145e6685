// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL event sink
//!
//! Appends one `LogEntry` JSON object per line. Each write opens, appends,
//! and closes the file; event-phase frequency is low enough that this is
//! the simple, safe choice. Failures must not break the pipeline; they are
//! reported via `tracing` and swallowed.

use crate::logger::EventSink;
use ol_core::LogEntry;
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Build from logger config: `{"path": "..."}`.
    pub fn from_config(config: &Map<String, Value>) -> Result<Self, String> {
        let path = config
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| "jsonl logger requires 'path'".to_string())?;
        Ok(Self::new(PathBuf::from(path)))
    }

    fn write_line(&self, entry: &LogEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

impl EventSink for JsonlSink {
    fn log(&self, entry: &LogEntry) {
        if let Err(e) = self.write_line(entry) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write event log entry"
            );
        }
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
