// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transform pipeline behavior through the full module flow.

use crate::prelude::*;
use ol_adapters::DropBotsTransform;
use ol_core::test_support::event;
use ol_core::LogPhase;
use serde_json::json;

fn drop_bots_config() -> ol_config::ModuleConfig {
    module_config(json!({
        "name": "m1",
        "sources": [{"id": "s1", "connector": "fake"}],
        "actors": [{"id": "a1", "connector": "fake"}],
        "transforms": [{"name": "strip-bots", "type": "package", "package": "drop-bots"}],
        "routes": [{
            "name": "r1",
            "when": {"source": "s1", "events": ["resource.changed"]},
            "transforms": [{"ref": "strip-bots"}],
            "then": {"actor": "a1"},
        }],
    }))
}

#[tokio::test]
async fn bot_events_drop_and_humans_pass() {
    let f = fixture_with_transforms(
        drop_bots_config(),
        vec![("strip-bots".to_string(), Box::new(DropBotsTransform))],
    )
    .await;

    let bot = event("s1")
        .id("evt_0000000000000B01")
        .provenance("author_type", "bot")
        .build();
    let human = event("s1")
        .id("evt_0000000000000H01")
        .provenance("author_type", "team_member")
        .build();

    f.runtime.inject(bot, Some("m1")).await.unwrap();
    f.runtime.inject(human, Some("m1")).await.unwrap();

    assert_eq!(f.actor.delivered_ids(), vec!["evt_0000000000000H01"]);

    let drops = f.sink.with_phase(LogPhase::TransformDrop);
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].event_id.as_str(), "evt_0000000000000B01");
}

#[tokio::test]
async fn missing_transform_is_fail_open() {
    // Config references a transform the resolver never produced
    let f = fixture(drop_bots_config()).await;

    f.runtime
        .inject(event("s1").build(), Some("m1"))
        .await
        .unwrap();

    // The event is delivered anyway; the miss lands in the log
    assert_eq!(f.actor.delivered().len(), 1);
    assert_eq!(f.sink.with_phase(LogPhase::TransformError).len(), 1);
}
