// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ol_core::test_support::event;

fn ctx() -> TransformContext {
    TransformContext {
        source: "s1".to_string(),
        target: "a1".to_string(),
        event_type: EventType::ResourceChanged,
        route_name: "r1".to_string(),
        config: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn drop_bots_drops_bot_events() {
    let transform = DropBotsTransform;
    let bot = event("s1").provenance("author_type", "bot").build();

    match transform.execute(bot, &ctx()).await {
        TransformOutcome::Drop => {}
        other => panic!("expected drop, got {other:?}"),
    }
}

#[tokio::test]
async fn drop_bots_passes_humans_unchanged() {
    let transform = DropBotsTransform;
    let human = event("s1").provenance("author_type", "team_member").build();
    let expected = human.clone();

    match transform.execute(human, &ctx()).await {
        TransformOutcome::Pass(out) => assert_eq!(out, expected),
        other => panic!("expected pass, got {other:?}"),
    }
}

#[tokio::test]
async fn drop_bots_passes_events_without_author_type() {
    let transform = DropBotsTransform;
    let anonymous = event("s1").build();

    assert!(matches!(
        transform.execute(anonymous, &ctx()).await,
        TransformOutcome::Pass(_)
    ));
}
