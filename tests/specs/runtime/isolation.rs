// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-module isolation: events never cross modules.

use crate::prelude::*;
use ol_adapters::{FakeActor, FakeSource};
use ol_engine::{ResolvedComponents, Runtime, RuntimeOptions};
use ol_core::test_support::event;
use serde_json::json;

async fn load(
    runtime: &Runtime,
    name: &str,
    source_id: &str,
    actor_id: &str,
) -> (FakeSource, FakeActor) {
    let source = FakeSource::new();
    let actor = FakeActor::new();
    let config = module_config(json!({
        "name": name,
        "sources": [{"id": source_id, "connector": "fake"}],
        "actors": [{"id": actor_id, "connector": "fake"}],
        "routes": [{
            "name": "r1",
            "when": {"source": source_id, "events": ["resource.changed"]},
            "then": {"actor": actor_id},
        }],
    }));

    runtime
        .load_module_with(
            config,
            ResolvedComponents {
                sources: vec![(source_id.to_string(), Box::new(source.clone()))],
                actors: vec![(actor_id.to_string(), Box::new(actor.clone()))],
                transforms: vec![],
                loggers: vec![],
            },
            vec![],
        )
        .await
        .unwrap();

    (source, actor)
}

#[tokio::test]
async fn events_stay_inside_their_module() {
    let runtime = Runtime::new(
        ol_adapters::ConnectorRegistry::new(),
        RuntimeOptions::default(),
    )
    .unwrap();

    let (_src_a, act_a) = load(&runtime, "A", "src-a", "act-a").await;
    let (_src_b, act_b) = load(&runtime, "B", "src-b", "act-b").await;

    runtime
        .inject(event("src-a").build(), Some("A"))
        .await
        .unwrap();

    assert_eq!(act_a.delivered().len(), 1);
    assert!(act_b.delivered().is_empty(), "B must see nothing of A's traffic");

    // Unload A; B continues to process
    runtime.unload_module("A").await.unwrap();
    runtime
        .inject(event("src-b").build(), Some("B"))
        .await
        .unwrap();
    assert_eq!(act_b.delivered().len(), 1);
    assert_eq!(act_a.delivered().len(), 1);
}

#[tokio::test]
async fn an_event_matching_another_modules_route_still_stays_home() {
    let runtime = Runtime::new(
        ol_adapters::ConnectorRegistry::new(),
        RuntimeOptions::default(),
    )
    .unwrap();

    // Both modules route the same source id pattern... except source ids
    // are process-wide, so B must use its own id. Inject an event whose
    // source matches B's route into A: nothing may happen anywhere.
    let (_src_a, act_a) = load(&runtime, "A", "src-a", "act-a").await;
    let (_src_b, act_b) = load(&runtime, "B", "src-b", "act-b").await;

    runtime
        .inject(event("src-b").build(), Some("A"))
        .await
        .unwrap();

    assert!(act_a.delivered().is_empty(), "A has no route for src-b");
    assert!(act_b.delivered().is_empty(), "B never saw the event");
}
