// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ol-engine: Router, transform pipeline, scheduler, and multi-module runtime

pub mod error;
pub mod fanout;
pub mod module;
pub mod pipeline;
pub mod router;
pub mod runtime;
pub mod scheduler;

pub use error::RuntimeError;
pub use fanout::LoggerFanout;
pub use module::{ModuleInstance, ModuleState, ResolvedComponents};
pub use pipeline::{run_pipeline, PipelineOutcome};
pub use router::match_routes;
pub use runtime::{ModuleSummary, Runtime, RuntimeOptions, RuntimeStatus};
pub use scheduler::PollScheduler;
