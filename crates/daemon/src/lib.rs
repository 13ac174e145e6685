// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! OrgLoop daemon (old)
//!
//! Background process hosting the multi-module runtime: it schedules
//! pollers, serves webhook intake and the loopback control API, and owns
//! the pid/port discovery files.

pub mod env;
pub mod lifecycle;
pub mod listener;

pub use lifecycle::{startup, Config, DaemonState, LifecycleError};
pub use listener::{serve, ListenCtx};
