// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-module event bus with at-least-once semantics.
//!
//! `publish` appends the event and fans it out to subscribers whose filter
//! matches; `ack` marks durable acknowledgement after all routes for the
//! event completed. `unacked` returns pending entries in ingest order for
//! crash recovery. An event may be delivered more than once after a crash;
//! downstream transforms carry the dedup responsibility.

use crate::wal::{Wal, WalError, WalRecord};
use async_trait::async_trait;
use ol_core::{Event, EventFilter, EventId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from bus operations
#[derive(Debug, Error)]
pub enum BusError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("unknown event id: {0}")]
    UnknownEvent(EventId),
}

/// Event bus contract shared by the in-memory and durable implementations.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Append the event and fan out to matching subscribers.
    async fn publish(&self, event: &Event) -> Result<(), BusError>;

    /// Mark durable acknowledgement for an entry.
    fn ack(&self, id: &EventId) -> Result<(), BusError>;

    /// All pending (unacked) events in ingest order.
    fn unacked(&self) -> Vec<Event>;

    /// Register a subscriber channel for events matching `filter`.
    fn subscribe(&self, filter: EventFilter, tx: mpsc::Sender<Event>);

    /// Reclaim space held by acked entries. No-op for in-memory buses.
    fn compact(&self) -> Result<(), BusError> {
        Ok(())
    }
}

/// Entry state shared by both implementations.
struct BusState {
    /// Ingest-ordered event ids.
    order: Vec<EventId>,
    /// id → (event, acked)
    entries: HashMap<EventId, (Event, bool)>,
    subscribers: Vec<(EventFilter, mpsc::Sender<Event>)>,
}

impl BusState {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            subscribers: Vec::new(),
        }
    }

    fn insert(&mut self, event: Event) {
        if !self.entries.contains_key(&event.id) {
            self.order.push(event.id.clone());
        }
        self.entries.insert(event.id.clone(), (event, false));
    }

    fn ack(&mut self, id: &EventId) -> Result<(), BusError> {
        match self.entries.get_mut(id) {
            Some((_, acked)) => {
                *acked = true;
                Ok(())
            }
            None => Err(BusError::UnknownEvent(id.clone())),
        }
    }

    fn unacked(&self) -> Vec<Event> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .filter(|(_, acked)| !acked)
            .map(|(event, _)| event.clone())
            .collect()
    }

    fn matching_senders(&self, event: &Event) -> Vec<mpsc::Sender<Event>> {
        self.subscribers
            .iter()
            .filter(|(filter, _)| filter.matches(event))
            .map(|(_, tx)| tx.clone())
            .collect()
    }
}

/// Fan an event out to subscriber channels concurrently, then return.
async fn fan_out(senders: Vec<mpsc::Sender<Event>>, event: &Event) {
    let mut handles = Vec::with_capacity(senders.len());
    for tx in senders {
        let event = event.clone();
        handles.push(tokio::spawn(async move {
            if tx.send(event).await.is_err() {
                tracing::debug!("bus subscriber dropped, skipping delivery");
            }
        }));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

/// In-memory bus: a map of entries plus subscriber channels. Used in tests
/// and for modules that opt out of durability.
pub struct MemoryBus {
    state: Arc<Mutex<BusState>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState::new())),
        }
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(&self, event: &Event) -> Result<(), BusError> {
        let senders = {
            let mut state = self.state.lock();
            state.insert(event.clone());
            state.matching_senders(event)
        };
        fan_out(senders, event).await;
        Ok(())
    }

    fn ack(&self, id: &EventId) -> Result<(), BusError> {
        self.state.lock().ack(id)
    }

    fn unacked(&self) -> Vec<Event> {
        self.state.lock().unacked()
    }

    fn subscribe(&self, filter: EventFilter, tx: mpsc::Sender<Event>) {
        self.state.lock().subscribers.push((filter, tx));
    }
}

/// Durable bus backed by an append-only WAL.
///
/// Events append as line-delimited JSON before fan-out; acks append as
/// tombstone records in the same file. On open, the log is replayed to
/// rebuild the pending set, so `unacked()` after a restart yields exactly
/// the entries whose processing never completed.
pub struct WalBus {
    wal: Arc<Mutex<Wal>>,
    state: Arc<Mutex<BusState>>,
}

impl WalBus {
    /// Open (or create) the WAL at `path` and rebuild the pending set.
    pub fn open(path: &Path) -> Result<Self, BusError> {
        let wal = Wal::open(path)?;
        let mut state = BusState::new();

        for record in wal.replay()? {
            match record {
                WalRecord::Event { event } => state.insert(event),
                WalRecord::Ack { id } => {
                    // Ack for an unknown id means the event line was lost to
                    // corruption rotation; nothing to mark.
                    let _ = state.ack(&id);
                }
            }
        }

        Ok(Self {
            wal: Arc::new(Mutex::new(wal)),
            state: Arc::new(Mutex::new(state)),
        })
    }
}

#[async_trait]
impl EventBus for WalBus {
    async fn publish(&self, event: &Event) -> Result<(), BusError> {
        {
            let mut wal = self.wal.lock();
            wal.append(&WalRecord::Event {
                event: event.clone(),
            })?;
        }

        let senders = {
            let mut state = self.state.lock();
            state.insert(event.clone());
            state.matching_senders(event)
        };
        fan_out(senders, event).await;
        Ok(())
    }

    fn ack(&self, id: &EventId) -> Result<(), BusError> {
        self.state.lock().ack(id)?;
        let mut wal = self.wal.lock();
        wal.append(&WalRecord::Ack { id: id.clone() })?;
        Ok(())
    }

    fn unacked(&self) -> Vec<Event> {
        self.state.lock().unacked()
    }

    fn subscribe(&self, filter: EventFilter, tx: mpsc::Sender<Event>) {
        self.state.lock().subscribers.push((filter, tx));
    }

    /// Rewrite the WAL dropping acked entries.
    fn compact(&self) -> Result<(), BusError> {
        let pending = self.state.lock().unacked();
        let mut wal = self.wal.lock();
        wal.rewrite(&pending)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
