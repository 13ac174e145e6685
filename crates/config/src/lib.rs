// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ol-config: Typed module configuration for OrgLoop
//!
//! A module configuration declares sources, actors, routes, transforms, and
//! loggers. Parsing front-ends are JSON and TOML; configs arrive as typed
//! structs with a raw `config` passthrough for connector-specific fields.

mod env_subst;
mod loader;
mod module;

pub use env_subst::resolve_env;
pub use loader::load_module_config;
pub use module::{
    ActorDef, ConfigError, Defaults, LoggerDef, ModuleConfig, PollConfig, RouteDef, RouteThen,
    RouteWhen, RouteWith, SourceDef, TransformDef, TransformKind, TransformRef,
};
