// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transform pipeline step contract
//!
//! A transform is one step in a route's pipeline. It never mutates the
//! input event; the outcome is an explicit sum: a replacement event, a
//! drop, or an error (which the pipeline treats as pass-through, fail-open).
//! Transforms may keep state across events; instances are per-module and
//! never shared between modules.

use async_trait::async_trait;
use ol_core::{AuthorType, Event, EventType};
use serde_json::{Map, Value};

/// Context handed to each transform step.
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// Source instance id of the event.
    pub source: String,
    /// Actor id the route delivers to.
    pub target: String,
    pub event_type: EventType,
    pub route_name: String,
    /// Transform base config with the route's per-step override
    /// shallow-merged on top.
    pub config: Map<String, Value>,
}

/// Explicit outcome of one transform step.
#[derive(Debug)]
pub enum TransformOutcome {
    /// Replace the current event for subsequent steps.
    Pass(Event),
    /// Suppress the event for this route.
    Drop,
    /// Step failed; the pipeline logs it and passes the event through
    /// unchanged.
    Error(String),
}

/// A pipeline step (in-process plugin or subprocess script; both implement
/// this trait). Teardown is RAII: dropping the instance releases whatever it
/// held.
#[async_trait]
pub trait Transform: Send + Sync {
    async fn execute(&self, event: Event, ctx: &TransformContext) -> TransformOutcome;
}

/// Built-in package transform `drop-bots`: suppresses events whose
/// `provenance.author_type` is `bot`.
pub struct DropBotsTransform;

#[async_trait]
impl Transform for DropBotsTransform {
    async fn execute(&self, event: Event, _ctx: &TransformContext) -> TransformOutcome {
        let author_type = event
            .provenance
            .get("author_type")
            .and_then(Value::as_str);
        if author_type == Some(AuthorType::Bot.as_str()) {
            TransformOutcome::Drop
        } else {
            TransformOutcome::Pass(event)
        }
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
