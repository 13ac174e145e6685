// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL write-ahead log for the durable event bus.
//!
//! Each line is a single JSON record: an appended event or an ack tombstone
//! (`{"kind":"event","event":{…}}` / `{"kind":"ack","id":"evt_…"}`).
//! Acks live in the same file as events so a crash can never separate an
//! event from its acknowledgement. Appends are flushed and fsync'd eagerly;
//! the durability point is the return from `append`.

use ol_core::{Event, EventId};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur in Wal operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single WAL record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalRecord {
    Event { event: Event },
    Ack { id: EventId },
}

/// Append-only JSONL log of events and ack tombstones.
pub struct Wal {
    file: File,
    path: PathBuf,
}

impl Wal {
    /// Open or create a WAL at the given path.
    ///
    /// A corrupt tail (torn final write) is tolerated: valid leading records
    /// are preserved, the damaged file is rotated to `.bak`, and a clean file
    /// containing only the valid records replaces it.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let (valid_lines, corrupt) = Self::scan(&file)?;

        let file = if corrupt {
            drop(file);
            let bak_path = rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_records = valid_lines.len(),
                "Corrupt WAL detected, rotating to .bak and preserving valid records",
            );
            std::fs::rename(path, &bak_path)?;

            {
                let mut new_file = File::create(path)?;
                for line in &valid_lines {
                    new_file.write_all(line.as_bytes())?;
                    new_file.write_all(b"\n")?;
                }
                new_file.sync_all()?;
            }

            OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(path)?
        } else {
            file
        };

        Ok(Self {
            file,
            path: path.to_owned(),
        })
    }

    /// Scan the WAL, returning valid lines and whether corruption was found.
    fn scan(file: &File) -> Result<(Vec<String>, bool), WalError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut valid_lines = Vec::new();
        let mut corrupt = false;
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    corrupt = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Stop at first unparseable record
            if serde_json::from_str::<WalRecord>(trimmed).is_err() {
                corrupt = true;
                break;
            }

            valid_lines.push(trimmed.to_string());
        }

        Ok((valid_lines, corrupt))
    }

    /// Append a record and make it durable before returning.
    pub fn append(&mut self, record: &WalRecord) -> Result<(), WalError> {
        let mut json_bytes = serde_json::to_vec(record)?;
        json_bytes.push(b'\n');
        self.file.write_all(&json_bytes)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Read back every record in append order.
    pub fn replay(&self) -> Result<Vec<WalRecord>, WalError> {
        let mut reader = BufReader::new(self.file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut records = Vec::new();
        let mut line = String::new();
        let mut offset = 0u64;

        loop {
            line.clear();
            let bytes_read = match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
                Err(e) => return Err(e.into()),
            };

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                match serde_json::from_str::<WalRecord>(trimmed) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!(
                            offset,
                            error = %e,
                            "Corrupt WAL record during replay, stopping at corruption point",
                        );
                        break;
                    }
                }
            }
            offset += bytes_read as u64;
        }

        Ok(records)
    }

    /// Rewrite the WAL keeping only the given events (in order).
    ///
    /// Called after compaction to reclaim space from acked entries.
    /// Writes to a temp file and renames atomically.
    pub fn rewrite(&mut self, events: &[Event]) -> Result<(), WalError> {
        let tmp_path = self.path.with_extension("tmp");

        {
            let mut tmp_file = File::create(&tmp_path)?;
            for event in events {
                let record = WalRecord::Event {
                    event: event.clone(),
                };
                let mut json_bytes = serde_json::to_vec(&record)?;
                json_bytes.push(b'\n');
                tmp_file.write_all(&json_bytes)?;
            }
            tmp_file.sync_all()?;
        }

        std::fs::rename(&tmp_path, &self.path)?;

        self.file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Path for rotating a damaged WAL out of the way.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let mut bak = path.as_os_str().to_owned();
    bak.push(".bak");
    PathBuf::from(bak)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
