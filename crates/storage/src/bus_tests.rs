// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ol_core::test_support::event;
use ol_core::EventType;
use tokio::sync::mpsc;

fn sample(id: &str, source: &str) -> Event {
    event(source).id(id).build()
}

#[tokio::test]
async fn memory_bus_tracks_acks() {
    let bus = MemoryBus::new();
    let e1 = sample("evt_0000000000000001", "s1");
    let e2 = sample("evt_0000000000000002", "s1");

    bus.publish(&e1).await.unwrap();
    bus.publish(&e2).await.unwrap();
    assert_eq!(bus.unacked().len(), 2);

    bus.ack(&e1.id).unwrap();
    let pending = bus.unacked();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, e2.id);
}

#[tokio::test]
async fn ack_of_unknown_id_errors() {
    let bus = MemoryBus::new();
    assert!(matches!(
        bus.ack(&EventId::new("evt_0000000000000009")),
        Err(BusError::UnknownEvent(_))
    ));
}

#[tokio::test]
async fn subscribers_receive_matching_events_only() {
    let bus = MemoryBus::new();
    let (tx_all, mut rx_all) = mpsc::channel(8);
    let (tx_s1, mut rx_s1) = mpsc::channel(8);
    let (tx_stopped, mut rx_stopped) = mpsc::channel(8);

    bus.subscribe(EventFilter::any(), tx_all);
    bus.subscribe(
        EventFilter {
            source: Some("s1".to_string()),
            event_type: None,
        },
        tx_s1,
    );
    bus.subscribe(
        EventFilter {
            source: None,
            event_type: Some(EventType::ActorStopped),
        },
        tx_stopped,
    );

    bus.publish(&sample("evt_0000000000000001", "s1"))
        .await
        .unwrap();
    bus.publish(&sample("evt_0000000000000002", "s2"))
        .await
        .unwrap();

    assert_eq!(rx_all.recv().await.unwrap().source, "s1");
    assert_eq!(rx_all.recv().await.unwrap().source, "s2");
    assert_eq!(rx_s1.recv().await.unwrap().source, "s1");
    assert!(rx_s1.try_recv().is_err(), "s2 event must not reach s1 filter");
    assert!(rx_stopped.try_recv().is_err());
}

#[tokio::test]
async fn dropped_subscriber_does_not_fail_publish() {
    let bus = MemoryBus::new();
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    bus.subscribe(EventFilter::any(), tx);

    bus.publish(&sample("evt_0000000000000001", "s1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn wal_bus_replays_unacked_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");

    let e1 = sample("evt_0000000000000001", "s1");
    let e2 = sample("evt_0000000000000002", "s1");
    let e3 = sample("evt_0000000000000003", "s1");

    {
        let bus = WalBus::open(&path).unwrap();
        bus.publish(&e1).await.unwrap();
        bus.publish(&e2).await.unwrap();
        bus.publish(&e3).await.unwrap();
        bus.ack(&e2.id).unwrap();
    }

    // "Crash" and reopen: unacked entries come back in ingest order
    let bus = WalBus::open(&path).unwrap();
    let pending = bus.unacked();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, e1.id);
    assert_eq!(pending[1].id, e3.id);
}

#[tokio::test]
async fn wal_bus_compact_drops_acked_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");

    let e1 = sample("evt_0000000000000001", "s1");
    let e2 = sample("evt_0000000000000002", "s1");

    let bus = WalBus::open(&path).unwrap();
    bus.publish(&e1).await.unwrap();
    bus.publish(&e2).await.unwrap();
    bus.ack(&e1.id).unwrap();
    bus.compact().unwrap();

    let bus = WalBus::open(&path).unwrap();
    let pending = bus.unacked();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, e2.id);
}

#[tokio::test]
async fn wal_bus_fans_out_like_memory_bus() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let bus = WalBus::open(&path).unwrap();

    let (tx, mut rx) = mpsc::channel(4);
    bus.subscribe(EventFilter::any(), tx);

    let e = sample("evt_0000000000000001", "s1");
    bus.publish(&e).await.unwrap();
    assert_eq!(rx.recv().await.unwrap().id, e.id);
}
