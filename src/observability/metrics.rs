//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define tracker metrics (starts, finishes, timeouts, late responses)
//! - Expose Prometheus-compatible metrics endpoint
//! - Label everything by request group
//!
//! # Metrics
//! - `request_watch_requests_started_total` (counter)
//! - `request_watch_requests_finished_total` (counter)
//! - `request_watch_timeouts_total` (counter)
//! - `request_watch_late_responses_total` (counter)
//! - `request_watch_in_flight` (gauge): tracked requests per group
//! - `request_watch_group_busy` (gauge): 1=busy announced, 0=otherwise
//! - `request_watch_request_duration_seconds` (histogram): normal finishes
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Only the binary installs the exporter

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request_started(group: &str) {
    counter!("request_watch_requests_started_total", "group" => group.to_string()).increment(1);
}

pub fn record_request_finished(group: &str, elapsed: Duration) {
    counter!("request_watch_requests_finished_total", "group" => group.to_string()).increment(1);
    histogram!("request_watch_request_duration_seconds", "group" => group.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_timeout(group: &str) {
    counter!("request_watch_timeouts_total", "group" => group.to_string()).increment(1);
}

pub fn record_late_response(group: &str) {
    counter!("request_watch_late_responses_total", "group" => group.to_string()).increment(1);
}

pub fn record_in_flight(group: &str, count: usize) {
    gauge!("request_watch_in_flight", "group" => group.to_string()).set(count as f64);
}

pub fn record_busy(group: &str, busy: bool) {
    gauge!("request_watch_group_busy", "group" => group.to_string())
        .set(if busy { 1.0 } else { 0.0 });
}
