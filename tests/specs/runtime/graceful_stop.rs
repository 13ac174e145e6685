// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful stop: components shut down exactly once and logging goes quiet.

use crate::prelude::*;
use ol_core::test_support::event;

#[tokio::test]
async fn stop_shuts_components_down_exactly_once() {
    let f = fixture(single_route_config()).await;

    f.runtime
        .inject(event("s1").build(), Some("m1"))
        .await
        .unwrap();

    f.runtime.stop().await;
    f.runtime.stop().await; // idempotent

    assert_eq!(f.source.shutdown_calls(), 1);
    assert_eq!(f.actor.shutdown_calls(), 1);
    assert!(!f.runtime.is_running());
}

#[tokio::test]
async fn no_log_entries_after_stop_returns() {
    let f = fixture(single_route_config()).await;
    f.runtime
        .inject(event("s1").build(), Some("m1"))
        .await
        .unwrap();

    f.runtime.stop().await;
    let entries_at_stop = f.sink.entries().len();

    // Further injection is impossible (the module registry is drained)
    let result = f.runtime.inject(event("s1").build(), Some("m1")).await;
    assert!(result.is_err());

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(f.sink.entries().len(), entries_at_stop);
}
