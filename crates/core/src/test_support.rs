// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders for events
#![cfg_attr(coverage_nightly, coverage(off))]
#![allow(clippy::unwrap_used)]

use crate::event::{Event, EventType};
use crate::id::{EventId, TraceId};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Builder for test events with sensible defaults.
pub struct EventBuilder {
    id: EventId,
    timestamp: DateTime<Utc>,
    source: String,
    event_type: EventType,
    provenance: Map<String, Value>,
    payload: Map<String, Value>,
    trace_id: TraceId,
}

impl EventBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        let mut provenance = Map::new();
        provenance.insert("platform".to_string(), Value::String("test".to_string()));
        Self {
            id: EventId::new("evt_0000000000000001"),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
            source: source.into(),
            event_type: EventType::ResourceChanged,
            provenance,
            payload: Map::new(),
            trace_id: TraceId::new("trc_0000000000000001"),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = EventId::new(id);
        self
    }

    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn provenance(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.provenance.insert(key.to_string(), value.into());
        self
    }

    pub fn payload_json(mut self, payload: Value) -> Self {
        if let Value::Object(map) = payload {
            self.payload = map;
        }
        self
    }

    pub fn payload(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = TraceId::new(id);
        self
    }

    pub fn build(self) -> Event {
        Event {
            id: self.id,
            timestamp: self.timestamp,
            source: self.source,
            event_type: self.event_type,
            provenance: self.provenance,
            payload: self.payload,
            trace_id: self.trace_id,
        }
    }
}

/// Shorthand for a valid `resource.changed` event from `source`.
pub fn event(source: &str) -> EventBuilder {
    EventBuilder::new(source)
}
