// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured log entries emitted for each phase of an event's journey.
//!
//! Every entry for one event shares the event's `trace_id`, so the full
//! path (emit → route → transform → deliver) can be reassembled from any
//! logger's output.

use crate::event::EventType;
use crate::id::{EventId, TraceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Phase taxonomy for structured log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogPhase {
    #[serde(rename = "source.emit")]
    SourceEmit,
    #[serde(rename = "transform.start")]
    TransformStart,
    #[serde(rename = "transform.pass")]
    TransformPass,
    #[serde(rename = "transform.drop")]
    TransformDrop,
    #[serde(rename = "transform.error")]
    TransformError,
    #[serde(rename = "route.match")]
    RouteMatch,
    #[serde(rename = "route.no_match")]
    RouteNoMatch,
    #[serde(rename = "deliver.attempt")]
    DeliverAttempt,
    #[serde(rename = "deliver.success")]
    DeliverSuccess,
    #[serde(rename = "deliver.failure")]
    DeliverFailure,
    #[serde(rename = "deliver.retry")]
    DeliverRetry,
    #[serde(rename = "system.start")]
    SystemStart,
    #[serde(rename = "system.stop")]
    SystemStop,
    #[serde(rename = "system.error")]
    SystemError,
}

impl LogPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogPhase::SourceEmit => "source.emit",
            LogPhase::TransformStart => "transform.start",
            LogPhase::TransformPass => "transform.pass",
            LogPhase::TransformDrop => "transform.drop",
            LogPhase::TransformError => "transform.error",
            LogPhase::RouteMatch => "route.match",
            LogPhase::RouteNoMatch => "route.no_match",
            LogPhase::DeliverAttempt => "deliver.attempt",
            LogPhase::DeliverSuccess => "deliver.success",
            LogPhase::DeliverFailure => "deliver.failure",
            LogPhase::DeliverRetry => "deliver.retry",
            LogPhase::SystemStart => "system.start",
            LogPhase::SystemStop => "system.stop",
            LogPhase::SystemError => "system.error",
        }
    }
}

impl std::fmt::Display for LogPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub event_id: EventId,
    pub trace_id: TraceId,
    pub phase: LogPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

impl LogEntry {
    /// Start an entry for the given phase of an event.
    pub fn for_event(phase: LogPhase, event: &crate::event::Event) -> Self {
        Self {
            timestamp: Utc::now(),
            event_id: event.id.clone(),
            trace_id: event.trace_id.clone(),
            phase,
            source: Some(event.source.clone()),
            target: None,
            route: None,
            transform: None,
            event_type: Some(event.event_type),
            result: None,
            duration_ms: None,
            queue_depth: None,
            error: None,
            metadata: None,
            workspace: None,
        }
    }

    /// An entry with no backing event (system phases).
    pub fn system(phase: LogPhase) -> Self {
        Self {
            timestamp: Utc::now(),
            event_id: EventId::new(""),
            trace_id: TraceId::new(""),
            phase,
            source: None,
            target: None,
            route: None,
            transform: None,
            event_type: None,
            result: None,
            duration_ms: None,
            queue_depth: None,
            error: None,
            metadata: None,
            workspace: None,
        }
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
