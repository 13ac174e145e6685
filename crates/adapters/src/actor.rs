// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actor (delivery target) contract

use async_trait::async_trait;
use ol_core::Event;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from actor operations
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("init failed: {0}")]
    Init(String),
    #[error("deliver failed: {0}")]
    Deliver(String),
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Rejected,
    Error,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Rejected => "rejected",
            DeliveryStatus::Error => "error",
        }
    }
}

/// Result of `deliver`.
#[derive(Debug)]
pub struct Delivery {
    pub status: DeliveryStatus,
    /// Published back through the module's bus when present, closing the loop.
    pub response_event: Option<Event>,
    pub error: Option<String>,
}

impl Delivery {
    pub fn delivered() -> Self {
        Self {
            status: DeliveryStatus::Delivered,
            response_event: None,
            error: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Rejected,
            response_event: None,
            error: Some(reason.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Error,
            response_event: None,
            error: Some(reason.into()),
        }
    }

    pub fn with_response(mut self, event: Event) -> Self {
        self.response_event = Some(event);
        self
    }
}

/// A connector instance that consumes events via `deliver`.
///
/// Delivery is not retried by the engine; retry policy (and deliver
/// timeouts) belong to the actor itself.
#[async_trait]
pub trait Actor: Send + Sync {
    async fn init(&mut self) -> Result<(), ActorError> {
        Ok(())
    }

    /// Deliver one event with the resolved route config (route `then.config`
    /// shallow-merged with the launch prompt fields when configured).
    async fn deliver(
        &self,
        event: &Event,
        route_config: &Map<String, Value>,
    ) -> Result<Delivery, ActorError>;

    async fn shutdown(&mut self) {}
}
