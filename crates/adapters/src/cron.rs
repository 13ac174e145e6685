// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron tick source
//!
//! Emits one `resource.changed` tick event per poll. Routes fan ticks out to
//! actors the same way any other source's events flow.

use crate::connector::{PollResult, Source, SourceError};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use ol_core::{Event, EventType, IdGen, MonotonicIdGen};
use serde_json::{json, Map, Value};

pub struct CronSource {
    source_id: String,
    schedule: String,
    tick: u64,
    ids: MonotonicIdGen,
}

impl CronSource {
    pub fn new(source_id: &str, config: &Map<String, Value>) -> Result<Self, SourceError> {
        let schedule = config
            .get("schedule")
            .and_then(Value::as_str)
            .unwrap_or(source_id)
            .to_string();
        Ok(Self {
            source_id: source_id.to_string(),
            schedule,
            tick: 0,
            ids: MonotonicIdGen,
        })
    }
}

#[async_trait]
impl Source for CronSource {
    async fn poll(&mut self, _checkpoint: Option<&str>) -> Result<PollResult, SourceError> {
        self.tick += 1;
        let now = Utc::now();

        let mut provenance = Map::new();
        provenance.insert("platform".to_string(), Value::String("cron".to_string()));
        provenance.insert(
            "platform_event".to_string(),
            Value::String("cron.tick".to_string()),
        );
        provenance.insert("author".to_string(), Value::String("system".to_string()));
        provenance.insert(
            "author_type".to_string(),
            Value::String("system".to_string()),
        );

        let mut payload = Map::new();
        payload.insert("schedule".to_string(), Value::String(self.schedule.clone()));
        payload.insert("tick".to_string(), json!(self.tick));

        let event = Event {
            id: self.ids.event_id(),
            timestamp: now,
            source: self.source_id.clone(),
            event_type: EventType::ResourceChanged,
            provenance,
            payload,
            trace_id: self.ids.trace_id(),
        };

        Ok(PollResult {
            events: vec![event],
            checkpoint: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        })
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
