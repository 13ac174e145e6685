// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub rate-limit behavior through the source contract.

use ol_adapters::github::{ApiError, BatchPage, FakeGithubApi, GithubSource};
use ol_adapters::Source;
use ol_core::{Clock, FakeClock};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn config() -> Map<String, Value> {
    match json!({
        "repo": "acme/widgets",
        "token": "ghp_test",
        "events": ["pull_request.opened"],
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn rate_limited_poll_returns_partial_and_next_tick_waits() {
    let clock = FakeClock::default();
    let api = FakeGithubApi::new();

    // Mock the batch query to die with 403 + remaining=0 and a reset just
    // ahead in wall time
    let reset_at = clock.now() + chrono::Duration::milliseconds(60);
    api.push_batch_error(ApiError::Status {
        status: 403,
        rate_limit_remaining: Some(0),
        reset_at: Some(reset_at),
    });
    api.push_batch_page(BatchPage::default());

    let mut source =
        GithubSource::with_client("gh", &config(), Arc::new(api.clone()), clock.clone()).unwrap();

    // Poll 1: zero events, but the poll itself succeeds (partial result)
    let result = source.poll(None).await.unwrap();
    assert!(result.events.is_empty());
    assert_eq!(source.rate_limit_remaining(), Some(0));

    // Poll 2: observes remaining == 0 and sleeps until the reset before
    // touching the network
    let started = std::time::Instant::now();
    source.poll(None).await.unwrap();
    assert!(
        started.elapsed() >= std::time::Duration::from_millis(50),
        "second tick must wait for the reset window"
    );
    assert_eq!(api.batch_calls(), 2);
}
