// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module configuration model

use ol_core::{parse_duration, EventType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from configuration loading and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("environment variable '{name}' is not set (referenced as ${{{name}}})")]
    MissingEnvVar { name: String },
    #[error("module '{module}': duplicate {kind} id '{id}'")]
    DuplicateId {
        module: String,
        kind: &'static str,
        id: String,
    },
    #[error("module '{module}': route '{route}' references unknown {kind} '{id}'")]
    UnknownReference {
        module: String,
        route: String,
        kind: &'static str,
        id: String,
    },
    #[error("module '{module}': source '{source_id}': invalid poll interval '{interval}': {message}")]
    InvalidInterval {
        module: String,
        source_id: String,
        interval: String,
        message: String,
    },
    #[error("module '{module}': transform '{transform}': {message}")]
    InvalidTransform {
        module: String,
        transform: String,
        message: String,
    },
    #[error("module name is empty")]
    EmptyModuleName,
}

/// One loaded configuration: sources, actors, routes, transforms, loggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    #[serde(default)]
    pub actors: Vec<ActorDef>,
    #[serde(default)]
    pub routes: Vec<RouteDef>,
    #[serde(default)]
    pub transforms: Vec<TransformDef>,
    #[serde(default)]
    pub loggers: Vec<LoggerDef>,
    #[serde(default)]
    pub defaults: Defaults,
    /// Directory the config file was loaded from; prompt files resolve
    /// relative to this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_path: Option<PathBuf>,
    /// The config file itself (set by the loader, recorded in the module
    /// registry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Module-level defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<String>,
}

/// A connector instance that produces events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDef {
    pub id: String,
    pub connector: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Absent for webhook-only sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval: String,
}

/// A connector instance that consumes events via `deliver`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorDef {
    pub id: String,
    pub connector: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// Declarative mapping from (source, event types, filter) to an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDef {
    pub name: String,
    pub when: RouteWhen,
    #[serde(default)]
    pub transforms: Vec<TransformRef>,
    pub then: RouteThen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<RouteWith>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteWhen {
    pub source: String,
    pub events: Vec<EventType>,
    /// Dot-path → expected value; paths may contain `[]` for
    /// any-element-matches semantics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformRef {
    #[serde(rename = "ref")]
    pub reference: String,
    /// Shallow-merged over the transform's base config for this route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteThen {
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteWith {
    pub prompt_file: PathBuf,
}

/// A pipeline step definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransformKind,
    /// In-process plugin name (`type = package`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Script path (`type = script`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Package,
    Script,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerDef {
    pub id: String,
    pub logger: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ModuleConfig {
    /// Validate internal consistency.
    ///
    /// Checks unique component ids, resolvable route references, and
    /// parseable poll intervals. Connector-specific config is validated by
    /// the connector's own `init`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyModuleName);
        }

        let source_ids = unique_ids(&self.name, "source", self.sources.iter().map(|s| &s.id))?;
        let actor_ids = unique_ids(&self.name, "actor", self.actors.iter().map(|a| &a.id))?;
        let transform_names =
            unique_ids(&self.name, "transform", self.transforms.iter().map(|t| &t.name))?;
        unique_ids(&self.name, "logger", self.loggers.iter().map(|l| &l.id))?;
        unique_ids(&self.name, "route", self.routes.iter().map(|r| &r.name))?;

        for source in &self.sources {
            if let Some(poll) = &source.poll {
                parse_duration(&poll.interval).map_err(|message| ConfigError::InvalidInterval {
                    module: self.name.clone(),
                    source_id: source.id.clone(),
                    interval: poll.interval.clone(),
                    message,
                })?;
            }
        }

        for transform in &self.transforms {
            match transform.kind {
                TransformKind::Package if transform.package.is_none() => {
                    return Err(ConfigError::InvalidTransform {
                        module: self.name.clone(),
                        transform: transform.name.clone(),
                        message: "type 'package' requires a 'package' field".to_string(),
                    });
                }
                TransformKind::Script if transform.script.is_none() => {
                    return Err(ConfigError::InvalidTransform {
                        module: self.name.clone(),
                        transform: transform.name.clone(),
                        message: "type 'script' requires a 'script' field".to_string(),
                    });
                }
                _ => {}
            }
        }

        for route in &self.routes {
            if !source_ids.contains(route.when.source.as_str()) {
                return Err(ConfigError::UnknownReference {
                    module: self.name.clone(),
                    route: route.name.clone(),
                    kind: "source",
                    id: route.when.source.clone(),
                });
            }
            if !actor_ids.contains(route.then.actor.as_str()) {
                return Err(ConfigError::UnknownReference {
                    module: self.name.clone(),
                    route: route.name.clone(),
                    kind: "actor",
                    id: route.then.actor.clone(),
                });
            }
            for step in &route.transforms {
                if !transform_names.contains(step.reference.as_str()) {
                    return Err(ConfigError::UnknownReference {
                        module: self.name.clone(),
                        route: route.name.clone(),
                        kind: "transform",
                        id: step.reference.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Look up a transform definition by name.
    pub fn get_transform(&self, name: &str) -> Option<&TransformDef> {
        self.transforms.iter().find(|t| t.name == name)
    }

    /// Effective poll interval for a source, falling back to module defaults.
    pub fn poll_interval<'a>(&'a self, source: &'a SourceDef) -> Option<&'a str> {
        source
            .poll
            .as_ref()
            .map(|p| p.interval.as_str())
            .or(self.defaults.poll_interval.as_deref())
    }
}

fn unique_ids<'a>(
    module: &str,
    kind: &'static str,
    ids: impl Iterator<Item = &'a String>,
) -> Result<HashSet<&'a str>, ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(ConfigError::DuplicateId {
                module: module.to_string(),
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(seen)
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
