// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle types for coding-harness connectors.
//!
//! The wire contract is `{phase, terminal, outcome?, reason?, dedupe_key}`.
//! The `terminal ⇔ phase ∈ {completed, failed, stopped}` invariant is encoded
//! in the type system: the non-terminal and terminal variants carry their
//! respective required fields, and deserialization rejects inconsistent
//! payloads instead of propagating them.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from lifecycle validation
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("unknown lifecycle phase: {0}")]
    UnknownPhase(String),
    #[error("phase '{phase}' is {actual} but terminal={flag}")]
    TerminalMismatch {
        phase: String,
        actual: &'static str,
        flag: bool,
    },
    #[error("terminal lifecycle for phase '{0}' requires an outcome")]
    MissingOutcome(String),
}

/// Phases of a session that is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonTerminalPhase {
    Started,
    Active,
}

/// Phases of a session that has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPhase {
    Completed,
    Failed,
    Stopped,
}

/// How a terminal session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    Cancelled,
    Unknown,
}

/// Which coding harness produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Harness {
    ClaudeCode,
    Codex,
    Opencode,
    Pi,
    PiRust,
    #[serde(other)]
    Other,
}

impl Harness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Harness::ClaudeCode => "claude-code",
            Harness::Codex => "codex",
            Harness::Opencode => "opencode",
            Harness::Pi => "pi",
            Harness::PiRust => "pi-rust",
            Harness::Other => "other",
        }
    }
}

/// Lifecycle sub-object carried in `payload.lifecycle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// Session is still running; maps to `resource.changed` envelopes.
    Active {
        phase: NonTerminalPhase,
        reason: Option<String>,
        dedupe_key: String,
    },
    /// Session has ended; maps to `actor.stopped` envelopes.
    Terminal {
        phase: TerminalPhase,
        outcome: Outcome,
        reason: Option<String>,
        dedupe_key: String,
    },
}

impl Lifecycle {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Lifecycle::Terminal { .. })
    }

    pub fn phase_str(&self) -> &'static str {
        match self {
            Lifecycle::Active { phase, .. } => match phase {
                NonTerminalPhase::Started => "started",
                NonTerminalPhase::Active => "active",
            },
            Lifecycle::Terminal { phase, .. } => match phase {
                TerminalPhase::Completed => "completed",
                TerminalPhase::Failed => "failed",
                TerminalPhase::Stopped => "stopped",
            },
        }
    }

    pub fn dedupe_key(&self) -> &str {
        match self {
            Lifecycle::Active { dedupe_key, .. } | Lifecycle::Terminal { dedupe_key, .. } => {
                dedupe_key
            }
        }
    }
}

/// Build the `<harness>:<session_id>:<phase>` dedupe key.
pub fn dedupe_key(harness: Harness, session_id: &str, phase: &str) -> String {
    format!("{}:{}:{}", harness.as_str(), session_id, phase)
}

/// Flat wire representation used by the serde impls.
#[derive(Serialize, Deserialize)]
struct LifecycleWire {
    phase: String,
    terminal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    dedupe_key: String,
}

impl Serialize for Lifecycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Lifecycle::Active { reason, dedupe_key, .. } => LifecycleWire {
                phase: self.phase_str().to_string(),
                terminal: false,
                outcome: None,
                reason: reason.clone(),
                dedupe_key: dedupe_key.clone(),
            },
            Lifecycle::Terminal {
                outcome,
                reason,
                dedupe_key,
                ..
            } => LifecycleWire {
                phase: self.phase_str().to_string(),
                terminal: true,
                outcome: Some(*outcome),
                reason: reason.clone(),
                dedupe_key: dedupe_key.clone(),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Lifecycle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = LifecycleWire::deserialize(deserializer)?;
        Lifecycle::from_wire(wire).map_err(D::Error::custom)
    }
}

impl Lifecycle {
    fn from_wire(wire: LifecycleWire) -> Result<Self, LifecycleError> {
        let non_terminal = match wire.phase.as_str() {
            "started" => Some(NonTerminalPhase::Started),
            "active" => Some(NonTerminalPhase::Active),
            _ => None,
        };
        let terminal = match wire.phase.as_str() {
            "completed" => Some(TerminalPhase::Completed),
            "failed" => Some(TerminalPhase::Failed),
            "stopped" => Some(TerminalPhase::Stopped),
            _ => None,
        };

        match (non_terminal, terminal, wire.terminal) {
            (Some(phase), None, false) => Ok(Lifecycle::Active {
                phase,
                reason: wire.reason,
                dedupe_key: wire.dedupe_key,
            }),
            (None, Some(phase), true) => {
                let outcome = wire
                    .outcome
                    .ok_or(LifecycleError::MissingOutcome(wire.phase.clone()))?;
                Ok(Lifecycle::Terminal {
                    phase,
                    outcome,
                    reason: wire.reason,
                    dedupe_key: wire.dedupe_key,
                })
            }
            (Some(_), None, true) => Err(LifecycleError::TerminalMismatch {
                phase: wire.phase,
                actual: "non-terminal",
                flag: true,
            }),
            (None, Some(_), false) => Err(LifecycleError::TerminalMismatch {
                phase: wire.phase,
                actual: "terminal",
                flag: false,
            }),
            _ => Err(LifecycleError::UnknownPhase(wire.phase)),
        }
    }
}

/// Session sub-object carried in `payload.session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub adapter: String,
    pub harness: Harness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Present only for terminal phases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Present only for terminal phases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<i32>,
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
