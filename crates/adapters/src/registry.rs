// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connector registry
//!
//! Registration yields constructors, never instances: every module gets its
//! own source/actor/transform/logger instances, so state is never shared
//! across modules.

use crate::actor::{Actor, ActorError};
use crate::connector::{Source, SourceError};
use crate::cron::CronSource;
use crate::github::GithubSource;
use crate::http::HttpActor;
use crate::jsonl::JsonlSink;
use crate::logger::{EventSink, TracingSink};
use crate::transform::{DropBotsTransform, Transform};
use crate::webhook::WebhookSource;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

type SourceCtor =
    Arc<dyn Fn(&str, &Map<String, Value>) -> Result<Box<dyn Source>, SourceError> + Send + Sync>;
type ActorCtor =
    Arc<dyn Fn(&str, &Map<String, Value>) -> Result<Box<dyn Actor>, ActorError> + Send + Sync>;
type TransformCtor =
    Arc<dyn Fn(&Map<String, Value>) -> Result<Box<dyn Transform>, String> + Send + Sync>;
type LoggerCtor =
    Arc<dyn Fn(&Map<String, Value>) -> Result<Box<dyn EventSink>, String> + Send + Sync>;

/// Constructors for every registered connector kind.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    sources: HashMap<String, SourceCtor>,
    actors: HashMap<String, ActorCtor>,
    transforms: HashMap<String, TransformCtor>,
    loggers: HashMap<String, LoggerCtor>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in connectors.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register_source("github", |id, config| {
            Ok(Box::new(GithubSource::new(id, config)?))
        });
        registry.register_source("webhook", |id, config| {
            Ok(Box::new(WebhookSource::new(id, config)?))
        });
        registry.register_source("cron", |id, config| {
            Ok(Box::new(CronSource::new(id, config)?))
        });

        registry.register_actor("http", |_id, config| {
            Ok(Box::new(HttpActor::new(config)?))
        });

        registry.register_transform("drop-bots", |_config| Ok(Box::new(DropBotsTransform)));

        registry.register_logger("jsonl", |config| {
            Ok(Box::new(JsonlSink::from_config(config)?))
        });
        registry.register_logger("tracing", |_config| Ok(Box::new(TracingSink)));

        registry
    }

    pub fn register_source<F>(&mut self, connector: &str, ctor: F)
    where
        F: Fn(&str, &Map<String, Value>) -> Result<Box<dyn Source>, SourceError>
            + Send
            + Sync
            + 'static,
    {
        self.sources.insert(connector.to_string(), Arc::new(ctor));
    }

    pub fn register_actor<F>(&mut self, connector: &str, ctor: F)
    where
        F: Fn(&str, &Map<String, Value>) -> Result<Box<dyn Actor>, ActorError>
            + Send
            + Sync
            + 'static,
    {
        self.actors.insert(connector.to_string(), Arc::new(ctor));
    }

    pub fn register_transform<F>(&mut self, package: &str, ctor: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Box<dyn Transform>, String> + Send + Sync + 'static,
    {
        self.transforms.insert(package.to_string(), Arc::new(ctor));
    }

    pub fn register_logger<F>(&mut self, logger: &str, ctor: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Box<dyn EventSink>, String> + Send + Sync + 'static,
    {
        self.loggers.insert(logger.to_string(), Arc::new(ctor));
    }

    pub fn create_source(
        &self,
        connector: &str,
        id: &str,
        config: &Map<String, Value>,
    ) -> Result<Box<dyn Source>, SourceError> {
        let ctor = self
            .sources
            .get(connector)
            .ok_or_else(|| SourceError::Init(format!("unknown source connector '{connector}'")))?;
        ctor(id, config)
    }

    pub fn create_actor(
        &self,
        connector: &str,
        id: &str,
        config: &Map<String, Value>,
    ) -> Result<Box<dyn Actor>, ActorError> {
        let ctor = self
            .actors
            .get(connector)
            .ok_or_else(|| ActorError::Init(format!("unknown actor connector '{connector}'")))?;
        ctor(id, config)
    }

    pub fn create_transform(
        &self,
        package: &str,
        config: &Map<String, Value>,
    ) -> Result<Box<dyn Transform>, String> {
        let ctor = self
            .transforms
            .get(package)
            .ok_or_else(|| format!("unknown transform package '{package}'"))?;
        ctor(config)
    }

    pub fn create_logger(
        &self,
        logger: &str,
        config: &Map<String, Value>,
    ) -> Result<Box<dyn EventSink>, String> {
        let ctor = self
            .loggers
            .get(logger)
            .ok_or_else(|| format!("unknown logger '{logger}'"))?;
        ctor(config)
    }

    pub fn has_source(&self, connector: &str) -> bool {
        self.sources.contains_key(connector)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
