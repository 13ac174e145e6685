// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ol_core::test_support::event;
use std::io::Write as _;

fn sample_event(id: &str) -> Event {
    event("s1").id(id).build()
}

#[test]
fn appends_and_replays_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path).unwrap();

    wal.append(&WalRecord::Event {
        event: sample_event("evt_0000000000000001"),
    })
    .unwrap();
    wal.append(&WalRecord::Ack {
        id: EventId::new("evt_0000000000000001"),
    })
    .unwrap();
    wal.append(&WalRecord::Event {
        event: sample_event("evt_0000000000000002"),
    })
    .unwrap();

    let records = wal.replay().unwrap();
    assert_eq!(records.len(), 3);
    assert!(matches!(&records[0], WalRecord::Event { event } if event.id == "evt_0000000000000001"));
    assert!(matches!(&records[1], WalRecord::Ack { id } if *id == "evt_0000000000000001"));
    assert!(matches!(&records[2], WalRecord::Event { event } if event.id == "evt_0000000000000002"));
}

#[test]
fn survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&WalRecord::Event {
            event: sample_event("evt_0000000000000001"),
        })
        .unwrap();
    }

    let wal = Wal::open(&path).unwrap();
    assert_eq!(wal.replay().unwrap().len(), 1);
}

#[test]
fn corrupt_tail_is_rotated_and_valid_records_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&WalRecord::Event {
            event: sample_event("evt_0000000000000001"),
        })
        .unwrap();
    }

    // Simulate a torn write
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap();
        file.write_all(b"{\"kind\":\"event\",\"eve").unwrap();
    }

    let wal = Wal::open(&path).unwrap();
    let records = wal.replay().unwrap();
    assert_eq!(records.len(), 1, "valid leading record preserved");

    let bak = dir.path().join("events.wal.bak");
    assert!(bak.exists(), "damaged file rotated to .bak");
}

#[test]
fn rewrite_drops_everything_not_listed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path).unwrap();

    let keep = sample_event("evt_0000000000000002");
    wal.append(&WalRecord::Event {
        event: sample_event("evt_0000000000000001"),
    })
    .unwrap();
    wal.append(&WalRecord::Event {
        event: keep.clone(),
    })
    .unwrap();

    wal.rewrite(std::slice::from_ref(&keep)).unwrap();

    let records = wal.replay().unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(&records[0], WalRecord::Event { event } if event.id == keep.id));
}

#[test]
fn appends_after_rewrite_land_in_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let mut wal = Wal::open(&path).unwrap();

    wal.rewrite(&[]).unwrap();
    wal.append(&WalRecord::Event {
        event: sample_event("evt_0000000000000003"),
    })
    .unwrap();

    assert_eq!(wal.replay().unwrap().len(), 1);
}
