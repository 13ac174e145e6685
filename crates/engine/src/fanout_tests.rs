// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ol_adapters::RecordingSink;
use ol_core::test_support::event;
use ol_core::LogPhase;

#[test]
fn emits_to_every_sink() {
    let a = RecordingSink::new();
    let b = RecordingSink::new();
    let fanout = LoggerFanout::new(vec![Box::new(a.clone()), Box::new(b.clone())]);

    let e = event("s1").build();
    fanout.emit(&LogEntry::for_event(LogPhase::SourceEmit, &e));

    assert_eq!(a.entries().len(), 1);
    assert_eq!(b.entries().len(), 1);
    assert_eq!(fanout.len(), 2);
}

#[test]
fn empty_fanout_is_a_no_op() {
    let fanout = LoggerFanout::empty();
    assert!(fanout.is_empty());
    let e = event("s1").build();
    fanout.emit(&LogEntry::for_event(LogPhase::SourceEmit, &e));
}
