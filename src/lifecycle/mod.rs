//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast → tracker actor exits → groups dropped
//!     → pending debounce/timeout timers aborted
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → caller stops the tracker
//! ```
//!
//! # Design Decisions
//! - In-flight requests are not drained on shutdown; they are dropped
//! - Triggering twice is harmless

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
