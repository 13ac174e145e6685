// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll scheduling
//!
//! One ticker task per registered (module, source). The first tick fires
//! immediately; ticks are not re-entrant: a poll still in flight when the
//! next interval elapses drops that tick. Tickers are isolated: a failing
//! poll never stops another source's schedule.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Callback invoked on each tick with (module, source id).
pub type PollCallback =
    Arc<dyn Fn(String, String) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Process-wide poll scheduler. Per-source slots are owned by their module.
pub struct PollScheduler {
    callback: PollCallback,
    tickers: Mutex<HashMap<(String, String), CancellationToken>>,
    root: CancellationToken,
}

impl PollScheduler {
    pub fn new(callback: PollCallback) -> Self {
        Self {
            callback,
            tickers: Mutex::new(HashMap::new()),
            root: CancellationToken::new(),
        }
    }

    /// Register a source and start its ticker. Replaces any prior ticker
    /// for the same (module, source).
    pub fn add_source(&self, module: &str, source_id: &str, interval: Duration) {
        let key = (module.to_string(), source_id.to_string());
        let token = self.root.child_token();

        {
            let mut tickers = self.tickers.lock();
            if let Some(old) = tickers.insert(key.clone(), token.clone()) {
                old.cancel();
            }
        }

        let callback = Arc::clone(&self.callback);
        let (module, source_id) = key;
        debug!(module = %module, source = %source_id, ?interval, "scheduling poll ticker");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A poll in progress drops the next tick instead of queueing it
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // In-flight polls abort promptly on stop()
                        tokio::select! {
                            _ = token.cancelled() => break,
                            _ = callback(module.clone(), source_id.clone()) => {}
                        }
                    }
                }
            }
            debug!(module = %module, source = %source_id, "poll ticker stopped");
        });
    }

    /// Cancel one source's ticker.
    pub fn remove_source(&self, module: &str, source_id: &str) {
        let key = (module.to_string(), source_id.to_string());
        if let Some(token) = self.tickers.lock().remove(&key) {
            token.cancel();
        }
    }

    /// Cancel every ticker owned by a module.
    pub fn remove_module(&self, module: &str) {
        let mut tickers = self.tickers.lock();
        tickers.retain(|(m, _), token| {
            if m == module {
                token.cancel();
                false
            } else {
                true
            }
        });
    }

    /// Number of live tickers.
    pub fn len(&self) -> usize {
        self.tickers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.lock().is_empty()
    }

    /// Cancel all tickers and signal in-flight polls to abort.
    pub fn stop(&self) {
        info!("stopping poll scheduler");
        self.root.cancel();
        self.tickers.lock().clear();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
