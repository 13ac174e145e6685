// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event logger contract

use ol_core::LogEntry;

/// Receives one structured entry per pipeline phase.
///
/// Sinks must not fail the pipeline: implementations swallow their own
/// errors (reporting via `tracing`).
pub trait EventSink: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// Sink that forwards entries to the `tracing` subscriber.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, entry: &LogEntry) {
        tracing::info!(
            phase = %entry.phase,
            event_id = %entry.event_id,
            trace_id = %entry.trace_id,
            route = entry.route.as_deref(),
            target = entry.target.as_deref(),
            error = entry.error.as_deref(),
            "event phase"
        );
    }
}
