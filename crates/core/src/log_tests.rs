// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::event;

#[test]
fn phases_use_dotted_wire_names() {
    let value = serde_json::to_value(LogPhase::RouteNoMatch).unwrap();
    assert_eq!(value, "route.no_match");
    let value = serde_json::to_value(LogPhase::SourceEmit).unwrap();
    assert_eq!(value, "source.emit");
}

#[test]
fn entry_inherits_event_identity() {
    let e = event("s1").build();
    let entry = LogEntry::for_event(LogPhase::SourceEmit, &e);

    assert_eq!(entry.event_id, e.id);
    assert_eq!(entry.trace_id, e.trace_id);
    assert_eq!(entry.source.as_deref(), Some("s1"));
    assert_eq!(entry.event_type, Some(EventType::ResourceChanged));
}

#[test]
fn absent_fields_are_omitted_from_json() {
    let e = event("s1").build();
    let entry = LogEntry::for_event(LogPhase::RouteMatch, &e).route("r1");
    let value = serde_json::to_value(&entry).unwrap();

    assert_eq!(value["phase"], "route.match");
    assert_eq!(value["route"], "r1");
    assert!(value.get("target").is_none());
    assert!(value.get("error").is_none());
    assert!(value.get("duration_ms").is_none());
}

#[test]
fn builder_helpers_set_fields() {
    let e = event("s1").build();
    let entry = LogEntry::for_event(LogPhase::DeliverSuccess, &e)
        .route("r1")
        .target("a1")
        .result("delivered")
        .duration_ms(42);

    assert_eq!(entry.target.as_deref(), Some("a1"));
    assert_eq!(entry.result.as_deref(), Some("delivered"));
    assert_eq!(entry.duration_ms, Some(42));
}

#[test]
fn entry_round_trips() {
    let e = event("s1").build();
    let entry = LogEntry::for_event(LogPhase::TransformError, &e)
        .transform("strip-bots")
        .error("exit code 3");
    let json = serde_json::to_string(&entry).unwrap();
    let back: LogEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}
