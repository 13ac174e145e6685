// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source connector contract
//!
//! A source produces events either by polling (driven by the scheduler) or
//! by handling webhook requests (driven by the HTTP listener). Lifecycle:
//! `init` → repeated `poll`/`webhook` → `shutdown`.

use async_trait::async_trait;
use ol_core::Event;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("init failed: {0}")]
    Init(String),
    /// Network trouble, HTTP 5xx, timeouts. The checkpoint is retained and
    /// the next tick retries.
    #[error("transient poll error: {0}")]
    Transient(String),
    /// HTTP 401/403 that was not a rate limit and survived a token
    /// re-resolve. The tick returns empty; scheduling continues.
    #[error("auth error: {0}")]
    Auth(String),
    #[error("source error: {0}")]
    Other(String),
}

/// Errors from webhook handling, mapped to HTTP statuses by the listener.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// 400
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// 401
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// 404 when the connector does not accept webhooks
    #[error("webhooks not supported by this source")]
    Unsupported,
}

/// An inbound webhook request as seen by a source.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Header names lower-cased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl WebhookRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }
}

/// Result of one poll.
#[derive(Debug, Default)]
pub struct PollResult {
    /// Events in the order the source observed them.
    pub events: Vec<Event>,
    /// New cursor; `None` leaves the stored checkpoint untouched.
    pub checkpoint: Option<String>,
}

/// A connector instance that produces events.
#[async_trait]
pub trait Source: Send + Sync {
    /// Validate configuration and open any clients. Failure puts the owning
    /// module into the degraded state; the source gets no poll ticks.
    async fn init(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Fetch events newer than `checkpoint`.
    ///
    /// Within one source, polls are serialized by the scheduler; connector
    /// state needs no locking beyond that invariant.
    async fn poll(&mut self, checkpoint: Option<&str>) -> Result<PollResult, SourceError>;

    /// Handle an inbound webhook, returning the events it produced.
    async fn webhook(&self, _request: &WebhookRequest) -> Result<Vec<Event>, WebhookError> {
        Err(WebhookError::Unsupported)
    }

    async fn shutdown(&mut self) {}
}
