// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file loading (JSON and TOML front-ends)

use crate::env_subst::resolve_env;
use crate::module::{ConfigError, ModuleConfig};
use std::path::Path;

/// Load, env-substitute, and validate a module config file.
///
/// The format is chosen by extension (`.json` or `.toml`). The config's
/// `module_path` is set to the file's parent directory so relative paths
/// (prompt files, scripts) resolve against it.
pub fn load_module_config(path: &Path) -> Result<ModuleConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        Some("toml") => {
            let parsed: toml::Value = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            serde_json::to_value(parsed).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let resolved = resolve_env(&value)?;
    let mut config: ModuleConfig =
        serde_json::from_value(resolved).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if config.module_path.is_none() {
        config.module_path = path.parent().map(|p| p.to_path_buf());
    }
    config.config_file = Some(path.to_path_buf());

    config.validate()?;
    tracing::debug!(
        module = %config.name,
        sources = config.sources.len(),
        routes = config.routes.len(),
        "loaded module config"
    );
    Ok(config)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
