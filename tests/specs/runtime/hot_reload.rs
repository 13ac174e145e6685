// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hot-reload: load over an existing name equals unload + load, with
//! checkpoints preserved for unchanged source ids.

use crate::prelude::*;
use ol_adapters::{FakeActor, FakeSource};
use ol_engine::{ResolvedComponents, Runtime, RuntimeOptions};
use ol_core::test_support::event;
use serde_json::json;

fn polling_config() -> ol_config::ModuleConfig {
    module_config(json!({
        "name": "m1",
        "sources": [{"id": "s1", "connector": "fake", "poll": {"interval": "1h"}}],
        "actors": [{"id": "a1", "connector": "fake"}],
        "routes": [{
            "name": "r1",
            "when": {"source": "s1", "events": ["resource.changed"]},
            "then": {"actor": "a1"},
        }],
    }))
}

fn components(source: &FakeSource, actor: &FakeActor) -> ResolvedComponents {
    ResolvedComponents {
        sources: vec![("s1".to_string(), Box::new(source.clone()))],
        actors: vec![("a1".to_string(), Box::new(actor.clone()))],
        transforms: vec![],
        loggers: vec![],
    }
}

#[tokio::test]
async fn reload_preserves_checkpoints_and_replaces_components() {
    let runtime = Runtime::new(
        ol_adapters::ConnectorRegistry::new(),
        RuntimeOptions::default(),
    )
    .unwrap();

    let first_source = FakeSource::new();
    let actor = FakeActor::new();
    runtime
        .load_module_with(polling_config(), components(&first_source, &actor), vec![])
        .await
        .unwrap();

    // One poll lands a checkpoint (fixture events carry a fixed timestamp)
    first_source.push_batch(vec![event("s1").build()]);
    runtime.poll_now("m1", "s1").await.unwrap();

    // Reload under the same name with a brand-new source instance
    let second_source = FakeSource::new();
    runtime
        .load_module_with(polling_config(), components(&second_source, &actor), vec![])
        .await
        .unwrap();

    // The old instance was fully torn down
    assert_eq!(first_source.shutdown_calls(), 1);
    assert_eq!(runtime.list_modules().len(), 1);

    // The new instance resumes from the old cursor
    runtime.poll_now("m1", "s1").await.unwrap();
    let seen = second_source.checkpoints_seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].as_deref(), Some("2026-01-15T12:00:00Z"));
}

#[tokio::test]
async fn reload_swaps_route_behavior() {
    let runtime = Runtime::new(
        ol_adapters::ConnectorRegistry::new(),
        RuntimeOptions::default(),
    )
    .unwrap();

    let source = FakeSource::new();
    let actor = FakeActor::new();
    runtime
        .load_module_with(polling_config(), components(&source, &actor), vec![])
        .await
        .unwrap();

    runtime
        .inject(event("s1").build(), Some("m1"))
        .await
        .unwrap();
    assert_eq!(actor.delivered().len(), 1);

    // New config drops the route: same module, different behavior
    let mut config = polling_config();
    config.routes.clear();
    let source2 = FakeSource::new();
    runtime
        .load_module_with(config, components(&source2, &actor), vec![])
        .await
        .unwrap();

    runtime
        .inject(event("s1").build(), Some("m1"))
        .await
        .unwrap();
    assert_eq!(actor.delivered().len(), 1, "no route, no delivery");
}
