// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ol-adapters: Connector, actor, transform, and logger plugins
//!
//! This crate defines the plugin contracts the engine dispatches through and
//! the built-in implementations: the batched GitHub poller, the generic
//! webhook source, the cron tick source, the HTTP delivery actor, the
//! subprocess script transform, and the JSONL event logger.

mod actor;
mod connector;
mod cron;
pub mod github;
mod http;
mod jsonl;
mod logger;
mod registry;
mod script;
mod transform;
mod webhook;

pub use actor::{Actor, ActorError, Delivery, DeliveryStatus};
pub use connector::{PollResult, Source, SourceError, WebhookError, WebhookRequest};
pub use cron::CronSource;
pub use github::{GithubApi, GithubSource, HttpGithubApi};
pub use http::HttpActor;
pub use jsonl::JsonlSink;
pub use logger::{EventSink, TracingSink};
pub use registry::ConnectorRegistry;
pub use script::ScriptTransform;
pub use transform::{DropBotsTransform, Transform, TransformContext, TransformOutcome};
pub use webhook::WebhookSource;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fakes;
#[cfg(any(test, feature = "test-support"))]
pub use fakes::{DeliveredCall, FakeActor, FakeSource, RecordingSink};
#[cfg(any(test, feature = "test-support"))]
pub use github::FakeGithubApi;
