//! Cancellable timers for the tracker actor.
//!
//! # Responsibilities
//! - Schedule a delayed `TimerFired` message back to the actor
//! - Cancel the timer when its handle is dropped
//!
//! # Design Decisions
//! - One spawned sleep per timer; the actor never sleeps itself
//! - Firing is a message, so timer work runs inside the serialized actor
//! - A firing can race with cancellation; receivers must treat stale
//!   firings as no-ops
//! - Handles are pruned once `is_finished`; dropping a fired handle is a no-op

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::tracker::request::RequestKey;

/// What a timer was armed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// Group debounce armed by an admission.
    Debounce,
    /// Per-request timeout for the request with this sequence number.
    Timeout { seq: u64, key: RequestKey },
}

/// Message delivered to the actor when a timer expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    /// Index of the owning group in tracker order.
    pub group: usize,
    pub kind: TimerKind,
}

/// Spawns timers that report back on the actor's timer channel.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<TimerFired>,
}

impl Scheduler {
    pub fn new(tx: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self { tx }
    }

    /// Deliver `fired` after `delay`. Never fires inline, even for zero.
    pub fn schedule(&self, delay: Duration, fired: TimerFired) -> TimerHandle {
        let deadline = Instant::now() + delay;
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            // Receiver gone means the tracker stopped.
            let _ = tx.send(fired);
        });
        TimerHandle { task }
    }
}

/// Owned handle to a pending timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debounce(group: usize) -> TimerFired {
        TimerFired {
            group,
            kind: TimerKind::Debounce,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let start = Instant::now();

        let _handle = scheduler.schedule(Duration::from_millis(75), debounce(3));

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, debounce(3));
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(75));
        assert!(waited < Duration::from_millis(80));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_is_not_inline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);

        let _handle = scheduler.schedule(Duration::ZERO, debounce(0));
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await.unwrap(), debounce(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);

        let handle = scheduler.schedule(Duration::from_millis(10), debounce(1));
        handle.cancel();
        let _kept = scheduler.schedule(Duration::from_millis(20), debounce(2));

        assert_eq!(rx.recv().await.unwrap(), debounce(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_reports_finished_after_firing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);

        let handle = scheduler.schedule(Duration::from_millis(5), debounce(0));
        assert!(!handle.is_finished());
        rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(handle.is_finished());
    }
}
