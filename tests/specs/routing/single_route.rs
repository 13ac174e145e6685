// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-route happy path and no-match behavior.

use crate::prelude::*;
use ol_core::test_support::event;
use ol_core::LogPhase;

#[tokio::test]
async fn happy_path_delivers_exactly_once() {
    let f = fixture(single_route_config()).await;

    let e = event("s1").id("evt_000000000000000A").build();
    f.runtime.inject(e, Some("m1")).await.unwrap();

    assert_eq!(f.actor.delivered_ids(), vec!["evt_000000000000000A"]);

    let phases = f.sink.phases();
    assert!(phases.contains(&LogPhase::SourceEmit));
    assert!(phases.contains(&LogPhase::DeliverSuccess));
    let matches = f.sink.with_phase(LogPhase::RouteMatch);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].route.as_deref(), Some("r1"));
}

#[tokio::test]
async fn no_match_yields_single_no_match_entry() {
    let f = fixture(single_route_config()).await;

    f.runtime
        .inject(event("unknown").build(), Some("m1"))
        .await
        .unwrap();

    assert!(f.actor.delivered().is_empty());
    assert_eq!(f.sink.with_phase(LogPhase::RouteNoMatch).len(), 1);
    assert!(f.sink.with_phase(LogPhase::RouteMatch).is_empty());
}

#[tokio::test]
async fn every_entry_shares_the_trace_id() {
    let f = fixture(single_route_config()).await;

    let e = event("s1").build();
    let trace_id = e.trace_id.clone();
    f.runtime.inject(e, Some("m1")).await.unwrap();

    let entries = f.sink.entries();
    assert!(!entries.is_empty());
    for entry in entries {
        assert_eq!(entry.trace_id, trace_id);
    }
}

#[tokio::test]
async fn polling_flows_events_through_routes() {
    let f = fixture(single_route_config()).await;
    f.source.push_batch(vec![event("s1").build(), event("s1").build()]);

    f.runtime.poll_now("m1", "s1").await.unwrap();

    assert_eq!(f.actor.delivered().len(), 2);
    assert_eq!(f.sink.with_phase(LogPhase::SourceEmit).len(), 2);
}
