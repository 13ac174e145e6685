// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route matching
//!
//! A route matches when its source equals the event's source, the event's
//! type is in the route's event set, and every filter entry matches. Filter
//! paths are `.`-separated walks over the envelope JSON; a `[]` segment
//! means "any element of the array matches the remainder".

use ol_config::RouteDef;
use ol_core::Event;
use serde_json::Value;

/// Ordered subset of routes whose `when` matches the event.
pub fn match_routes<'a>(event: &Event, routes: &'a [RouteDef]) -> Vec<&'a RouteDef> {
    let event_value = event.to_value();
    routes
        .iter()
        .filter(|route| {
            route.when.source == event.source
                && route.when.events.contains(&event.event_type)
                && filter_matches(&event_value, route)
        })
        .collect()
}

fn filter_matches(event_value: &Value, route: &RouteDef) -> bool {
    match &route.when.filter {
        None => true,
        Some(filter) => filter
            .iter()
            .all(|(path, expected)| matches_path(event_value, path, expected)),
    }
}

/// Evaluate one dot-path filter entry against the event JSON.
pub fn matches_path(value: &Value, path: &str, expected: &Value) -> bool {
    match path.split_once("[]") {
        None => resolve(value, path) == Some(expected),
        Some((array_path, remainder)) => {
            let Some(Value::Array(items)) = resolve(value, array_path.trim_end_matches('.'))
            else {
                return false;
            };
            if remainder.is_empty() {
                items.iter().any(|item| item == expected)
            } else {
                let remainder = remainder.strip_prefix('.').unwrap_or(remainder);
                items
                    .iter()
                    .any(|item| matches_path(item, remainder, expected))
            }
        }
    }
}

/// Walk `.`-separated segments through nested maps.
fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
