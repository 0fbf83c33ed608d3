//! Debounced busy/idle tracking for outstanding network requests.
//!
//! Requests are fed in by the transport layer as `(timestamp, url)` pairs.
//! Each configured request group decides whether the URL is relevant,
//! debounces a busy signal, and reports hung requests and late responses.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod replay;
pub mod routing;
pub mod tracker;

pub use config::schema::TrackerConfig;
pub use lifecycle::Shutdown;
pub use tracker::{RequestTracker, TrackerEvent};
