// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions
//!
//! Event ids are prefixed `evt_` and trace ids `trc_`. Production ids are
//! time-sortable: a base-36 millisecond timestamp followed by random
//! alphanumeric padding, so lexicographic order roughly follows creation
//! order within a process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Prefix for event ids.
pub const EVENT_ID_PREFIX: &str = "evt_";

/// Prefix for trace ids.
pub const TRACE_ID_PREFIX: &str = "trc_";

/// Minimum length of the part after the prefix.
const ID_BODY_LEN: usize = 16;

/// Trait for truncating identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Truncate a string to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    s.short(n)
}

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an event envelope (`evt_…`).
    pub struct EventId;
}

define_id! {
    /// Identifier grouping all log entries for one event's journey (`trc_…`).
    pub struct TraceId;
}

impl EventId {
    /// True when the id carries the `evt_` prefix and a long enough body.
    pub fn is_well_formed(&self) -> bool {
        well_formed(&self.0, EVENT_ID_PREFIX)
    }
}

impl TraceId {
    /// True when the id carries the `trc_` prefix and a long enough body.
    pub fn is_well_formed(&self) -> bool {
        well_formed(&self.0, TRACE_ID_PREFIX)
    }
}

fn well_formed(id: &str, prefix: &str) -> bool {
    match id.strip_prefix(prefix) {
        Some(body) => body.len() >= ID_BODY_LEN && body.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Generates unique identifiers
pub trait IdGen: Send + Sync {
    /// Produce the body of a new id (without prefix).
    fn next(&self) -> String;

    fn event_id(&self) -> EventId {
        EventId::new(format!("{}{}", EVENT_ID_PREFIX, self.next()))
    }

    fn trace_id(&self) -> TraceId {
        TraceId::new(format!("{}{}", TRACE_ID_PREFIX, self.next()))
    }
}

/// Time-sortable ID generator for production use.
///
/// Body layout: base-36 epoch milliseconds (zero-padded to 9 chars) followed
/// by 8 random alphanumeric characters.
#[derive(Clone, Default)]
pub struct MonotonicIdGen;

impl IdGen for MonotonicIdGen {
    fn next(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut body = base36(millis);
        // v4 entropy, hex-encoded; 8 chars is plenty within one millisecond
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        body.push_str(&suffix[..8]);
        body
    }
}

/// Encode a u64 as base-36, zero-padded to 9 characters.
fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = [b'0'; 9];
    let mut i = out.len();
    loop {
        i -= 1;
        out[i] = DIGITS[(n % 36) as usize];
        n /= 36;
        if n == 0 || i == 0 {
            break;
        }
    }
    out.iter().map(|&b| b as char).collect()
}

/// Sequential ID generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("seq")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        // Padded so generated ids satisfy the 16-char body minimum
        format!("{}{:016}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
