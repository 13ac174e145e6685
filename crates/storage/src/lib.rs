// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for OrgLoop
//!
//! Per-module event buses (in-memory and WAL-backed), the per-module
//! checkpoint store, and the daemon-wide module registry file.

mod bus;
mod checkpoint;
mod registry;
mod wal;

pub use bus::{BusError, EventBus, MemoryBus, WalBus};
pub use checkpoint::{is_epoch_checkpoint, CheckpointError, CheckpointStore};
pub use registry::{ModuleRecord, ModuleRegistry, RegistryError};
pub use wal::{Wal, WalError, WalRecord};
