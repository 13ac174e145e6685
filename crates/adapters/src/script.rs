// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess script transform
//!
//! A script transform is any executable (POSIX `#!` scripts included) that
//! reads the event JSON on stdin and speaks through its exit code:
//!
//! - exit 0 with non-empty JSON stdout → replacement event
//! - exit 0 with empty stdout, or exit 1 → drop
//! - exit ≥ 2 → error (the pipeline passes the event through, fail-open)
//!
//! Timeout enforcement is SIGTERM, then SIGKILL after a grace period.

use crate::transform::{Transform, TransformContext, TransformOutcome};
use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use ol_core::Event;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Default script timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Grace between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(2);

pub struct ScriptTransform {
    name: String,
    script: PathBuf,
    timeout: Duration,
    grace: Duration,
}

impl ScriptTransform {
    pub fn new(name: &str, script: PathBuf, timeout_ms: Option<u64>) -> Self {
        Self {
            name: name.to_string(),
            script,
            timeout: timeout_ms.map(Duration::from_millis).unwrap_or(DEFAULT_TIMEOUT),
            grace: KILL_GRACE,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    async fn run(&self, event: &Event, ctx: &TransformContext) -> Result<TransformOutcome, String> {
        let input =
            serde_json::to_vec(event).map_err(|e| format!("serialize event: {e}"))?;

        let mut child = Command::new(&self.script)
            .env("ORGLOOP_SOURCE", &ctx.source)
            .env("ORGLOOP_TARGET", &ctx.target)
            .env("ORGLOOP_EVENT_TYPE", ctx.event_type.as_str())
            .env("ORGLOOP_EVENT_ID", event.id.as_str())
            .env("ORGLOOP_ROUTE", &ctx.route_name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("spawn {}: {e}", self.script.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&input).await {
                debug!(script = %self.script.display(), error = %e, "stdin write failed");
            }
            // Closing stdin signals end of input
        }

        // Drain stdout/stderr concurrently with wait to avoid pipe deadlock
        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| "stdout not captured".to_string())?;
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf).await;
            buf
        });
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| "stderr not captured".to_string())?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf).await;
            buf
        });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(format!("wait on {}: {e}", self.name)),
            Err(_) => {
                self.terminate(&mut child).await;
                return Err(format!(
                    "transform '{}' timed out after {}ms",
                    self.name,
                    self.timeout.as_millis()
                ));
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        match status.code() {
            Some(0) => {
                let text = String::from_utf8_lossy(&stdout);
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(TransformOutcome::Drop);
                }
                match serde_json::from_str::<Event>(trimmed) {
                    Ok(replacement) => Ok(TransformOutcome::Pass(replacement)),
                    Err(e) => Err(format!(
                        "transform '{}' produced unparseable output: {e}",
                        self.name
                    )),
                }
            }
            Some(1) => Ok(TransformOutcome::Drop),
            Some(code) => Err(format!(
                "transform '{}' exited with code {code}: {}",
                self.name,
                String::from_utf8_lossy(&stderr).trim()
            )),
            None => Err(format!("transform '{}' killed by signal", self.name)),
        }
    }

    /// SIGTERM, wait out the grace period, then SIGKILL.
    async fn terminate(&self, child: &mut Child) {
        if let Some(pid) = child.id() {
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
        match tokio::time::timeout(self.grace, child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                warn!(transform = %self.name, "script ignored SIGTERM, killing");
                let _ = child.start_kill();
                let _ = child.wait().await;
            }
        }
    }
}

#[async_trait]
impl Transform for ScriptTransform {
    async fn execute(&self, event: Event, ctx: &TransformContext) -> TransformOutcome {
        match self.run(&event, ctx).await {
            Ok(outcome) => outcome,
            Err(message) => TransformOutcome::Error(message),
        }
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
