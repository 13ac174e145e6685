// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Default control/webhook port.
pub const DEFAULT_PORT: u16 = 4800;

/// Resolve state directory: ORGLOOP_STATE_DIR > XDG_STATE_HOME/orgloop >
/// ~/.local/state/orgloop
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ORGLOOP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("orgloop"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/orgloop"))
}

/// Listener port override (`ORGLOOP_PORT`; 0 asks the OS for a free port).
pub fn port() -> u16 {
    std::env::var("ORGLOOP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Drain window override for unload/stop (`ORGLOOP_DRAIN_MS`).
pub fn drain_window() -> Option<Duration> {
    std::env::var("ORGLOOP_DRAIN_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
