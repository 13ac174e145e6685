// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment substitution for config values.
//!
//! Any string of the form `${NAME}` (the whole string or embedded) resolves
//! from the process environment at init time. A missing variable fails with
//! an error naming the variable rather than silently passing the literal
//! through.

use crate::module::ConfigError;
use serde_json::Value;

/// Recursively substitute `${NAME}` references in every string leaf.
pub fn resolve_env(value: &Value) -> Result<Value, ConfigError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute(s)?)),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(resolve_env(item)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), resolve_env(item)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

/// Substitute all `${NAME}` occurrences in one string.
fn substitute(s: &str) -> Result<String, ConfigError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if name.is_empty() || !is_env_name(name) {
                    // Not an env reference (e.g. shell snippets); keep literal
                    out.push_str("${");
                    rest = after;
                    continue;
                }
                let value = std::env::var(name).map_err(|_| ConfigError::MissingEnvVar {
                    name: name.to_string(),
                })?;
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("${");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn is_env_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "env_subst_tests.rs"]
mod tests;
