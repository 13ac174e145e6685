// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn monotonic_ids_carry_prefixes() {
    let gen = MonotonicIdGen;
    let event_id = gen.event_id();
    let trace_id = gen.trace_id();

    assert!(event_id.as_str().starts_with("evt_"));
    assert!(trace_id.as_str().starts_with("trc_"));
    assert!(event_id.is_well_formed(), "id: {}", event_id);
    assert!(trace_id.is_well_formed(), "id: {}", trace_id);
}

#[test]
fn monotonic_ids_are_unique() {
    let gen = MonotonicIdGen;
    let a = gen.event_id();
    let b = gen.event_id();
    assert_ne!(a, b);
}

#[test]
fn monotonic_ids_sort_by_time() {
    // base36 millis are zero-padded, so an id minted later never sorts
    // before one minted at an earlier millisecond
    let gen = MonotonicIdGen;
    let a = gen.event_id();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = gen.event_id();
    assert!(a.as_str()[..13] <= b.as_str()[..13]);
}

#[test]
fn sequential_gen_is_deterministic() {
    let gen = SequentialIdGen::new("t");
    assert_eq!(gen.next(), "t0000000000000001");
    assert_eq!(gen.next(), "t0000000000000002");
}

#[test]
fn sequential_event_ids_are_well_formed() {
    let gen = SequentialIdGen::default();
    assert!(gen.event_id().is_well_formed());
    assert!(gen.trace_id().is_well_formed());
}

#[test]
fn malformed_ids_are_rejected() {
    assert!(!EventId::new("evt_short").is_well_formed());
    assert!(!EventId::new("trc_0000000000000001").is_well_formed());
    assert!(!EventId::new("evt_00000000-0000-01").is_well_formed());
    assert!(!TraceId::new("evt_0000000000000001").is_well_formed());
}

#[test]
fn short_truncates() {
    assert_eq!("abcdef".short(4), "abcd");
    assert_eq!("ab".short(4), "ab");
    assert_eq!(EventId::new("evt_123456").short(7), "evt_123");
}
