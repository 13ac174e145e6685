// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dot-path and array-contains filter behavior.

use crate::prelude::*;
use ol_core::test_support::event;
use serde_json::json;

fn label_filter_config() -> ol_config::ModuleConfig {
    module_config(json!({
        "name": "m1",
        "sources": [{"id": "s1", "connector": "fake"}],
        "actors": [{"id": "a1", "connector": "fake"}],
        "routes": [{
            "name": "urgent-only",
            "when": {
                "source": "s1",
                "events": ["resource.changed"],
                "filter": {"payload.labels[].name": "urgent"},
            },
            "then": {"actor": "a1"},
        }],
    }))
}

#[tokio::test]
async fn array_contains_matches_any_element() {
    let f = fixture(label_filter_config()).await;

    let tagged = event("s1")
        .id("evt_00000000000000T1")
        .payload("labels", json!([{"name": "p1"}, {"name": "urgent"}]))
        .build();
    let untagged = event("s1")
        .id("evt_00000000000000U1")
        .payload("labels", json!([{"name": "p1"}]))
        .build();

    f.runtime.inject(tagged, Some("m1")).await.unwrap();
    f.runtime.inject(untagged, Some("m1")).await.unwrap();

    assert_eq!(f.actor.delivered_ids(), vec!["evt_00000000000000T1"]);
}

#[tokio::test]
async fn filter_misses_when_path_absent() {
    let f = fixture(label_filter_config()).await;

    f.runtime
        .inject(event("s1").build(), Some("m1"))
        .await
        .unwrap();

    assert!(f.actor.delivered().is_empty());
}

#[tokio::test]
async fn multi_match_runs_every_matching_route() {
    let config = module_config(json!({
        "name": "m1",
        "sources": [{"id": "s1", "connector": "fake"}],
        "actors": [{"id": "a1", "connector": "fake"}],
        "routes": [
            {"name": "all-changes",
             "when": {"source": "s1", "events": ["resource.changed"]},
             "then": {"actor": "a1"}},
            {"name": "externals-only",
             "when": {"source": "s1", "events": ["resource.changed"],
                      "filter": {"provenance.author_type": "external"}},
             "then": {"actor": "a1"}},
        ],
    }));
    let f = fixture(config).await;

    let external = event("s1").provenance("author_type", "external").build();
    f.runtime.inject(external, Some("m1")).await.unwrap();

    assert_eq!(f.actor.delivered().len(), 2, "both routes deliver");
}
