//! In-flight request representation.
//!
//! # Responsibilities
//! - Identify a request by its `(started_at, url)` pair
//! - Own the request's timeout timer so removal cancels it
//!
//! # Design Decisions
//! - Public identity is the pair; two requests to the same URL started in
//!   the same millisecond are indistinguishable
//! - A private sequence number only correlates timeout firings

use std::fmt;

use crate::tracker::timers::TimerHandle;

/// Identity of a request as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    /// Start timestamp in milliseconds on the tracker clock.
    pub started_at: u64,
    pub url: String,
}

impl RequestKey {
    pub fn new(started_at: u64, url: impl Into<String>) -> Self {
        Self {
            started_at,
            url: url.into(),
        }
    }

    /// Milliseconds between the request start and `now_ms`.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.url, self.started_at)
    }
}

/// A single in-flight request owned by a group.
#[derive(Debug)]
pub struct TrackedRequest {
    key: RequestKey,
    seq: u64,
    /// Dropping the request aborts this timer.
    _timeout: Option<TimerHandle>,
}

impl TrackedRequest {
    pub(crate) fn new(key: RequestKey, seq: u64, timeout: Option<TimerHandle>) -> Self {
        Self {
            key,
            seq,
            _timeout: timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.key.url
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}
