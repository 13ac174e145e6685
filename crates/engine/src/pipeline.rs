// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transform pipeline execution
//!
//! Steps run sequentially in declared order. A missing transform reference
//! or a step error is logged and the event continues unchanged (fail-open);
//! only an explicit drop stops the pipeline for this route.

use crate::fanout::LoggerFanout;
use ol_adapters::{Transform, TransformContext, TransformOutcome};
use ol_config::{RouteDef, TransformRef};
use ol_core::{Event, LogEntry, LogPhase};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Final result of a route's pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Deliver this (possibly replaced) event.
    Deliver(Event),
    /// Event suppressed for this route.
    Dropped,
}

/// Shallow-merge `override_config` over `base`.
pub fn merge_config(
    base: &Map<String, Value>,
    override_config: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = base.clone();
    if let Some(overrides) = override_config {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Run one route's transform chain over an event.
///
/// `transforms` maps transform names to their per-module instances;
/// `base_configs` carries each transform's definition config for the
/// per-route shallow-merge.
pub async fn run_pipeline(
    event: Event,
    route: &RouteDef,
    transforms: &HashMap<String, Box<dyn Transform>>,
    base_configs: &HashMap<String, Map<String, Value>>,
    loggers: &LoggerFanout,
) -> PipelineOutcome {
    let mut current = event;

    for step in &route.transforms {
        let TransformRef { reference, config } = step;

        let Some(transform) = transforms.get(reference) else {
            // Fail-open: an unresolvable ref must not lose the event
            tracing::warn!(
                route = %route.name,
                transform = %reference,
                "transform not found, passing event through"
            );
            loggers.emit(
                &LogEntry::for_event(LogPhase::TransformError, &current)
                    .route(&route.name)
                    .transform(reference.as_str())
                    .error("transform not found"),
            );
            continue;
        };

        let ctx = TransformContext {
            source: current.source.clone(),
            target: route.then.actor.clone(),
            event_type: current.event_type,
            route_name: route.name.clone(),
            config: merge_config(
                base_configs.get(reference).unwrap_or(&Map::new()),
                config.as_ref(),
            ),
        };

        loggers.emit(
            &LogEntry::for_event(LogPhase::TransformStart, &current)
                .route(&route.name)
                .transform(reference.as_str()),
        );

        // The input event is immutable: the step either returns a
        // replacement or we keep the original
        match transform.execute(current.clone(), &ctx).await {
            TransformOutcome::Pass(next) => {
                loggers.emit(
                    &LogEntry::for_event(LogPhase::TransformPass, &next)
                        .route(&route.name)
                        .transform(reference.as_str()),
                );
                current = next;
            }
            TransformOutcome::Drop => {
                loggers.emit(
                    &LogEntry::for_event(LogPhase::TransformDrop, &current)
                        .route(&route.name)
                        .transform(reference.as_str()),
                );
                return PipelineOutcome::Dropped;
            }
            TransformOutcome::Error(message) => {
                tracing::error!(
                    route = %route.name,
                    transform = %reference,
                    error = %message,
                    "transform failed, passing event through"
                );
                loggers.emit(
                    &LogEntry::for_event(LogPhase::TransformError, &current)
                        .route(&route.name)
                        .transform(reference.as_str())
                        .error(message),
                );
            }
        }
    }

    PipelineOutcome::Deliver(current)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
