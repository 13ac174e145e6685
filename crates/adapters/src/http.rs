// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP delivery actor
//!
//! Posts `{event, config}` as JSON to a target URL. 2xx is delivered, 4xx
//! rejected, everything else (including network failure) an error. A JSON
//! response body may carry a `response_event` that the runtime republishes.

use crate::actor::{Actor, ActorError, Delivery};
use async_trait::async_trait;
use ol_core::Event;
use serde_json::{json, Map, Value};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub struct HttpActor {
    url: String,
    client: reqwest::Client,
}

impl HttpActor {
    pub fn new(config: &Map<String, Value>) -> Result<Self, ActorError> {
        let url = config
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ActorError::Init("http actor requires 'url'".to_string()))?
            .to_string();

        // Deliver timeouts are the actor's own policy
        let timeout_ms = config
            .get("timeout_ms")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let client = reqwest::Client::builder()
            .user_agent("orgloop")
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ActorError::Init(e.to_string()))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl Actor for HttpActor {
    async fn deliver(
        &self,
        event: &Event,
        route_config: &Map<String, Value>,
    ) -> Result<Delivery, ActorError> {
        let body = json!({
            "event": event,
            "config": route_config,
        });

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => return Ok(Delivery::failed(e.to_string())),
        };

        let status = response.status().as_u16();
        if (400..500).contains(&status) {
            return Ok(Delivery::rejected(format!("HTTP {status}")));
        }
        if !(200..300).contains(&status) {
            return Ok(Delivery::failed(format!("HTTP {status}")));
        }

        // Optional response event closes the loop
        let delivery = match response.json::<Value>().await {
            Ok(value) => match value.get("response_event") {
                Some(raw) => match serde_json::from_value::<Event>(raw.clone()) {
                    Ok(event) => Delivery::delivered().with_response(event),
                    Err(e) => {
                        tracing::warn!(url = %self.url, error = %e, "unparseable response_event");
                        Delivery::delivered()
                    }
                },
                None => Delivery::delivered(),
            },
            Err(_) => Delivery::delivered(),
        };

        Ok(delivery)
    }
}
