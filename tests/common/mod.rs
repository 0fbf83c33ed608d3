//! Shared utilities for tracker integration tests.
//!
//! Every test runs on a paused tokio clock, so waiting for a signal
//! auto-advances virtual time straight to the next timer.

use std::time::Duration;

use tokio::sync::broadcast;

use request_watch::config::{RequestGroupConfig, TrackerConfig};
use request_watch::TrackerEvent;

/// Tracker config with only the implicit default group.
pub fn config(delay_ms: i64, timeout_ms: Option<i64>) -> TrackerConfig {
    TrackerConfig {
        delay_ms: Some(delay_ms),
        timeout_ms,
        ..TrackerConfig::default()
    }
}

/// Tracker config with extra named groups in front of the default one.
#[allow(dead_code)]
pub fn config_with_groups(delay_ms: i64, groups: Vec<RequestGroupConfig>) -> TrackerConfig {
    TrackerConfig {
        request_groups: groups,
        ..config(delay_ms, None)
    }
}

/// Wait for the next signal, failing after a generous virtual deadline.
pub async fn next_event(rx: &mut broadcast::Receiver<TrackerEvent>) -> TrackerEvent {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("no signal emitted")
        .expect("signal channel closed")
}

/// Assert nothing is emitted for `ms` milliseconds of virtual time.
pub async fn assert_quiet(rx: &mut broadcast::Receiver<TrackerEvent>, ms: u64) {
    if let Ok(event) = tokio::time::timeout(Duration::from_millis(ms), rx.recv()).await {
        panic!("unexpected signal: {event:?}");
    }
}

#[allow(dead_code)]
pub fn busy(group: &str) -> TrackerEvent {
    TrackerEvent::Busy {
        group: group.to_string(),
    }
}

#[allow(dead_code)]
pub fn idle(group: &str) -> TrackerEvent {
    TrackerEvent::Idle {
        group: group.to_string(),
    }
}
