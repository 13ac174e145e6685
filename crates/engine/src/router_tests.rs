// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ol_core::test_support::event;
use ol_core::EventType;
use proptest::prelude::*;
use serde_json::json;

fn route(name: &str, source: &str, events: &[EventType], filter: Option<serde_json::Value>) -> RouteDef {
    serde_json::from_value(json!({
        "name": name,
        "when": {
            "source": source,
            "events": events.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
            "filter": filter,
        },
        "then": {"actor": "a1"},
    }))
    .unwrap()
}

#[test]
fn matches_on_source_and_event_type() {
    let routes = vec![
        route("r1", "s1", &[EventType::ResourceChanged], None),
        route("r2", "s2", &[EventType::ResourceChanged], None),
        route("r3", "s1", &[EventType::ActorStopped], None),
    ];

    let e = event("s1").build();
    let matched = match_routes(&e, &routes);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "r1");
}

#[test]
fn multi_match_returns_routes_in_declaration_order() {
    let routes = vec![
        route("first", "s1", &[EventType::ResourceChanged], None),
        route("second", "s1", &[EventType::ResourceChanged], None),
    ];

    let e = event("s1").build();
    let matched = match_routes(&e, &routes);
    let names: Vec<&str> = matched.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn filter_on_nested_path() {
    let routes = vec![route(
        "r1",
        "s1",
        &[EventType::ResourceChanged],
        Some(json!({"payload.review.state": "approved"})),
    )];

    let approved = event("s1")
        .payload("review", json!({"state": "approved"}))
        .build();
    assert_eq!(match_routes(&approved, &routes).len(), 1);

    let pending = event("s1")
        .payload("review", json!({"state": "pending"}))
        .build();
    assert!(match_routes(&pending, &routes).is_empty());

    let absent = event("s1").build();
    assert!(match_routes(&absent, &routes).is_empty());
}

#[test]
fn filter_on_provenance() {
    let routes = vec![route(
        "r1",
        "s1",
        &[EventType::ResourceChanged],
        Some(json!({"provenance.author_type": "team_member"})),
    )];

    let member = event("s1").provenance("author_type", "team_member").build();
    assert_eq!(match_routes(&member, &routes).len(), 1);

    let bot = event("s1").provenance("author_type", "bot").build();
    assert!(match_routes(&bot, &routes).is_empty());
}

#[test]
fn array_contains_with_remainder() {
    let routes = vec![route(
        "r1",
        "s1",
        &[EventType::ResourceChanged],
        Some(json!({"payload.labels[].name": "urgent"})),
    )];

    let tagged = event("s1")
        .payload("labels", json!([{"name": "p1"}, {"name": "urgent"}]))
        .build();
    assert_eq!(match_routes(&tagged, &routes).len(), 1);

    let untagged = event("s1")
        .payload("labels", json!([{"name": "p1"}]))
        .build();
    assert!(match_routes(&untagged, &routes).is_empty());
}

#[test]
fn array_contains_without_remainder() {
    let tagged = event("s1").payload("tags", json!(["a", "b"])).build();
    assert!(matches_path(&tagged.to_value(), "payload.tags[]", &json!("b")));
    assert!(!matches_path(&tagged.to_value(), "payload.tags[]", &json!("z")));
}

#[test]
fn array_path_on_non_array_fails() {
    let e = event("s1").payload("tags", "not-an-array").build();
    assert!(!matches_path(&e.to_value(), "payload.tags[]", &json!("a")));
}

#[test]
fn nested_array_paths_recurse() {
    let e = event("s1")
        .payload(
            "checks",
            json!([{"runs": [{"name": "unit"}, {"name": "lint"}]}]),
        )
        .build();
    assert!(matches_path(
        &e.to_value(),
        "payload.checks[].runs[].name",
        &json!("lint")
    ));
    assert!(!matches_path(
        &e.to_value(),
        "payload.checks[].runs[].name",
        &json!("e2e")
    ));
}

#[test]
fn multiple_filter_entries_are_anded() {
    let routes = vec![route(
        "r1",
        "s1",
        &[EventType::ResourceChanged],
        Some(json!({
            "provenance.author_type": "external",
            "payload.state": "open",
        })),
    )];

    let both = event("s1")
        .provenance("author_type", "external")
        .payload("state", "open")
        .build();
    assert_eq!(match_routes(&both, &routes).len(), 1);

    let one = event("s1")
        .provenance("author_type", "external")
        .payload("state", "closed")
        .build();
    assert!(match_routes(&one, &routes).is_empty());
}

proptest! {
    /// The `[]` semantics: a path with `[]` matches iff some element,
    /// substituted for the array, matches the remainder.
    #[test]
    fn array_filter_equals_exists_over_elements(
        values in proptest::collection::vec(0i64..50, 0..8),
        needle in 0i64..50,
    ) {
        let e = event("s1").payload("ns", json!(values)).build();
        let whole = matches_path(&e.to_value(), "payload.ns[]", &json!(needle));
        let exists = values.iter().any(|v| *v == needle);
        prop_assert_eq!(whole, exists);
    }
}
