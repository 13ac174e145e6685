// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event envelope for the OrgLoop system
//!
//! Events are immutable after construction: transforms never mutate an
//! envelope in place, they return a replacement (or drop it).

use crate::id::{EventId, TraceId};
use crate::lifecycle::Lifecycle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from envelope validation
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event id: {0}")]
    MalformedId(String),
    #[error("malformed trace id: {0}")]
    MalformedTraceId(String),
    #[error("event has empty source")]
    EmptySource,
    #[error("provenance is missing required key 'platform'")]
    MissingPlatform,
    #[error("invalid lifecycle payload: {0}")]
    InvalidLifecycle(String),
    #[error("event type '{event_type}' does not match lifecycle terminal={terminal}")]
    LifecycleMismatch {
        event_type: &'static str,
        terminal: bool,
    },
}

/// Canonical envelope types.
///
/// Terminal lifecycle phases map to `actor.stopped`; non-terminal phases to
/// `resource.changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "resource.changed")]
    ResourceChanged,
    #[serde(rename = "actor.stopped")]
    ActorStopped,
    #[serde(rename = "message.received")]
    MessageReceived,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ResourceChanged => "resource.changed",
            EventType::ActorStopped => "actor.stopped",
            EventType::MessageReceived => "message.received",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the author recorded in provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorType {
    TeamMember,
    External,
    Bot,
    System,
    Unknown,
}

impl AuthorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorType::TeamMember => "team_member",
            AuthorType::External => "external",
            AuthorType::Bot => "bot",
            AuthorType::System => "system",
            AuthorType::Unknown => "unknown",
        }
    }
}

/// Classify an author login.
///
/// `source_says_bot` is the upstream platform's own bot flag; a login ending
/// in `[bot]` (any case) is also a bot. Members of `team` classify as
/// team members; everyone else is external.
pub fn detect_author_type(login: &str, source_says_bot: bool, team: &[String]) -> AuthorType {
    if source_says_bot || login.to_lowercase().ends_with("[bot]") {
        return AuthorType::Bot;
    }
    if team.iter().any(|m| m == login) {
        return AuthorType::TeamMember;
    }
    AuthorType::External
}

/// Canonical event envelope.
///
/// Wire format:
/// `{id, timestamp, source, type, provenance, payload, trace_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Source-assigned event time (not ingest time), RFC 3339 UTC.
    pub timestamp: DateTime<Utc>,
    /// Source instance id.
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Must include `platform`; conventionally `platform_event`, `author`,
    /// `author_type`, plus connector-specific keys.
    pub provenance: Map<String, Value>,
    /// Opaque source-specific fields.
    pub payload: Map<String, Value>,
    pub trace_id: TraceId,
}

impl Event {
    /// Parse the `payload.lifecycle` sub-object, if present.
    pub fn lifecycle(&self) -> Result<Option<Lifecycle>, EventError> {
        match self.payload.get("lifecycle") {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| EventError::InvalidLifecycle(e.to_string())),
        }
    }

    /// Validate the envelope invariants.
    ///
    /// Checks id prefixes, non-empty source, the required `platform`
    /// provenance key, and `type == actor.stopped ⇔ lifecycle.terminal`.
    pub fn validate(&self) -> Result<(), EventError> {
        if !self.id.is_well_formed() {
            return Err(EventError::MalformedId(self.id.to_string()));
        }
        if !self.trace_id.is_well_formed() {
            return Err(EventError::MalformedTraceId(self.trace_id.to_string()));
        }
        if self.source.is_empty() {
            return Err(EventError::EmptySource);
        }
        if !self.provenance.contains_key("platform") {
            return Err(EventError::MissingPlatform);
        }
        if let Some(lifecycle) = self.lifecycle()? {
            let terminal = lifecycle.is_terminal();
            let stopped = self.event_type == EventType::ActorStopped;
            if terminal != stopped {
                return Err(EventError::LifecycleMismatch {
                    event_type: self.event_type.as_str(),
                    terminal,
                });
            }
        }
        Ok(())
    }

    /// The `provenance.author` value, if any.
    pub fn author(&self) -> Option<&str> {
        self.provenance.get("author").and_then(Value::as_str)
    }

    /// The `provenance.platform_event` value, if any.
    pub fn platform_event(&self) -> Option<&str> {
        self.provenance.get("platform_event").and_then(Value::as_str)
    }

    /// The whole envelope as a JSON value (for filter evaluation).
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn log_summary(&self) -> String {
        let t = self.event_type.as_str();
        match self.platform_event() {
            Some(pe) => format!(
                "{t} id={} source={} platform_event={pe}",
                self.id.short(16),
                self.source
            ),
            None => format!("{t} id={} source={}", self.id.short(16), self.source),
        }
    }
}

/// Subscription filter for the event bus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub source: Option<String>,
    pub event_type: Option<EventType>,
}

impl EventFilter {
    /// Match everything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(source) = &self.source {
            if *source != event.source {
                return false;
            }
        }
        if let Some(event_type) = self.event_type {
            if event_type != event.event_type {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
