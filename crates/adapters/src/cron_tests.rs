// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn each_poll_emits_one_tick() {
    let mut config = Map::new();
    config.insert("schedule".to_string(), Value::String("nightly".to_string()));
    let mut source = CronSource::new("cron-1", &config).unwrap();

    let first = source.poll(None).await.unwrap();
    assert_eq!(first.events.len(), 1);
    let event = &first.events[0];
    assert_eq!(event.source, "cron-1");
    assert_eq!(event.payload["schedule"], "nightly");
    assert_eq!(event.payload["tick"], 1);
    assert!(first.checkpoint.is_some());
    assert!(event.validate().is_ok());

    let second = source.poll(first.checkpoint.as_deref()).await.unwrap();
    assert_eq!(second.events[0].payload["tick"], 2);
}

#[tokio::test]
async fn schedule_defaults_to_source_id() {
    let mut source = CronSource::new("cron-2", &Map::new()).unwrap();
    let result = source.poll(None).await.unwrap();
    assert_eq!(result.events[0].payload["schedule"], "cron-2");
}
