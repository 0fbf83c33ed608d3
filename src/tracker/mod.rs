//! Request tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Transport: on_start(ts, url) / on_finish(ts, url)
//!     → service.rs (enqueue command, never blocks)
//!     → actor: fan out to every group whose filter accepts the URL
//!     → group.rs (state transition, arm/cancel timers)
//!     → timers.rs (spawned sleeps post TimerFired back to the actor)
//!     → events.rs (Busy / Idle / RequestTimedOut / LateResponse)
//!     → broadcast to subscribers
//! ```
//!
//! # Design Decisions
//! - Groups are independent; a URL may feed several at once
//! - All group state lives in one actor task (no locks)
//! - Identity is the `(started_at, url)` pair the transport already has
//! - The tracker only reports timeouts; it never cancels the request

pub mod clock;
pub mod events;
pub mod group;
pub mod request;
pub mod service;
pub mod timers;

pub use clock::Clock;
pub use events::TrackerEvent;
pub use group::{GroupState, GroupStatus, RequestGroup};
pub use request::{RequestKey, TrackedRequest};
pub use service::{RequestGuard, RequestTracker, TrackerError};
