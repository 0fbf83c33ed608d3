//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request groups produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr log stream
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (group, url, elapsed_ms) on every tracker log line
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
