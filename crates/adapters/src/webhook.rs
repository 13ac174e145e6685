// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic webhook source
//!
//! Receives inbound `POST /webhook/<source_id>` payloads. When a secret is
//! configured the request must carry an HMAC-SHA256 signature in
//! `X-Hub-Signature-256` or `X-Signature` (`sha256=<hex>`), compared in
//! constant time.

use crate::connector::{PollResult, Source, SourceError, WebhookError, WebhookRequest};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use ol_core::{Event, EventType, IdGen, MonotonicIdGen};
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Webhook-only source: it never polls.
pub struct WebhookSource {
    source_id: String,
    platform: String,
    event_type: EventType,
    secret: Option<String>,
    ids: MonotonicIdGen,
}

impl WebhookSource {
    pub fn new(source_id: &str, config: &Map<String, Value>) -> Result<Self, SourceError> {
        let platform = config
            .get("platform")
            .and_then(Value::as_str)
            .unwrap_or("webhook")
            .to_string();

        let event_type = match config.get("event_type").and_then(Value::as_str) {
            None => EventType::MessageReceived,
            Some(raw) => serde_json::from_value(Value::String(raw.to_string()))
                .map_err(|_| SourceError::Init(format!("invalid event_type '{raw}'")))?,
        };

        let secret = config
            .get("secret")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(Self {
            source_id: source_id.to_string(),
            platform,
            event_type,
            secret,
            ids: MonotonicIdGen,
        })
    }

    fn verify_signature(&self, request: &WebhookRequest) -> Result<(), WebhookError> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };

        let header = request
            .header("x-hub-signature-256")
            .or_else(|| request.header("x-signature"))
            .ok_or_else(|| WebhookError::Unauthorized("missing signature".to_string()))?;

        let hex = header
            .strip_prefix("sha256=")
            .ok_or_else(|| WebhookError::Unauthorized("malformed signature".to_string()))?;
        let expected = decode_hex(hex)
            .ok_or_else(|| WebhookError::Unauthorized("malformed signature".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| WebhookError::Unauthorized(e.to_string()))?;
        mac.update(&request.body);
        // verify_slice is constant-time
        mac.verify_slice(&expected)
            .map_err(|_| WebhookError::Unauthorized("signature mismatch".to_string()))
    }
}

#[async_trait]
impl Source for WebhookSource {
    async fn poll(&mut self, _checkpoint: Option<&str>) -> Result<PollResult, SourceError> {
        // Webhook sources are push-only; a scheduled tick is a config error
        Err(SourceError::Other(
            "webhook source does not poll".to_string(),
        ))
    }

    async fn webhook(&self, request: &WebhookRequest) -> Result<Vec<Event>, WebhookError> {
        self.verify_signature(request)?;

        let body: Value = serde_json::from_slice(&request.body)
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
        let payload = match body {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("body".to_string(), other);
                map
            }
        };

        let platform_event = payload
            .get("event")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .or_else(|| request.header("x-github-event").map(|s| s.to_string()))
            .unwrap_or_else(|| "webhook.received".to_string());

        let mut provenance = Map::new();
        provenance.insert(
            "platform".to_string(),
            Value::String(self.platform.clone()),
        );
        provenance.insert(
            "platform_event".to_string(),
            Value::String(platform_event),
        );

        Ok(vec![Event {
            id: self.ids.event_id(),
            timestamp: chrono::Utc::now(),
            source: self.source_id.clone(),
            event_type: self.event_type,
            provenance,
            payload,
            trace_id: self.ids.trace_id(),
        }])
    }
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
