// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test fixtures for behavioral specifications.

#![allow(dead_code)]

use ol_adapters::{FakeActor, FakeSource, RecordingSink};
use ol_config::ModuleConfig;
use ol_engine::{ResolvedComponents, Runtime, RuntimeOptions};
use serde_json::json;

/// A loaded module plus handles to its fakes.
pub struct Fixture {
    pub runtime: Runtime,
    pub source: FakeSource,
    pub actor: FakeActor,
    pub sink: RecordingSink,
}

/// Single source `s1` routed to single actor `a1` via route `r1`.
pub fn single_route_config() -> ModuleConfig {
    module_config(json!({
        "name": "m1",
        "sources": [{"id": "s1", "connector": "fake"}],
        "actors": [{"id": "a1", "connector": "fake"}],
        "routes": [{
            "name": "r1",
            "when": {"source": "s1", "events": ["resource.changed"]},
            "then": {"actor": "a1"},
        }],
    }))
}

pub fn module_config(value: serde_json::Value) -> ModuleConfig {
    serde_json::from_value(value).unwrap()
}

/// Load `config` into a fresh runtime with fake components.
pub async fn fixture(config: ModuleConfig) -> Fixture {
    fixture_with_transforms(config, vec![]).await
}

pub async fn fixture_with_transforms(
    config: ModuleConfig,
    transforms: Vec<(String, Box<dyn ol_adapters::Transform>)>,
) -> Fixture {
    let runtime = Runtime::new(
        ol_adapters::ConnectorRegistry::new(),
        RuntimeOptions::default(),
    )
    .unwrap();

    let source = FakeSource::new();
    let actor = FakeActor::new();
    let sink = RecordingSink::new();

    let sources = config
        .sources
        .iter()
        .map(|s| {
            (
                s.id.clone(),
                Box::new(source.clone()) as Box<dyn ol_adapters::Source>,
            )
        })
        .collect();
    let actors = config
        .actors
        .iter()
        .map(|a| {
            (
                a.id.clone(),
                Box::new(actor.clone()) as Box<dyn ol_adapters::Actor>,
            )
        })
        .collect();

    runtime
        .load_module_with(
            config,
            ResolvedComponents {
                sources,
                actors,
                transforms,
                loggers: vec![Box::new(sink.clone())],
            },
            vec![],
        )
        .await
        .unwrap();

    Fixture {
        runtime,
        source,
        actor,
        sink,
    }
}
