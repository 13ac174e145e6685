// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn state_dir_prefers_explicit_override() {
    std::env::set_var("ORGLOOP_STATE_DIR", "/tmp/ol-test-state");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/ol-test-state"));
    std::env::remove_var("ORGLOOP_STATE_DIR");
}

#[test]
#[serial]
fn state_dir_falls_back_to_xdg() {
    std::env::remove_var("ORGLOOP_STATE_DIR");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/orgloop"));
    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
#[serial]
fn port_defaults_when_unset_or_garbage() {
    std::env::remove_var("ORGLOOP_PORT");
    assert_eq!(port(), DEFAULT_PORT);

    std::env::set_var("ORGLOOP_PORT", "not-a-port");
    assert_eq!(port(), DEFAULT_PORT);

    std::env::set_var("ORGLOOP_PORT", "4999");
    assert_eq!(port(), 4999);
    std::env::remove_var("ORGLOOP_PORT");
}

#[test]
#[serial]
fn drain_window_parses_millis() {
    std::env::set_var("ORGLOOP_DRAIN_MS", "2500");
    assert_eq!(drain_window(), Some(Duration::from_millis(2500)));
    std::env::remove_var("ORGLOOP_DRAIN_MS");
    assert_eq!(drain_window(), None);
}
