//! Monotonic millisecond clock shared by the transport and the tracker.

use tokio::time::Instant;

/// Milliseconds elapsed since the tracker was built.
///
/// Backed by tokio's `Instant`, so paused test runtimes control it too.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Current timestamp in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
