//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request URL
//!     → matcher.rs (evaluate group whitelist/blacklist)
//!     → Return: relevant or not, per group
//!
//! Filter Compilation (at startup):
//!     RouteSpec[] (config)
//!     → Compile regexes
//!     → Freeze as immutable RouteFilter per group
//! ```
//!
//! # Design Decisions
//! - Filters compiled at startup, immutable at runtime
//! - Pure predicates: no state, safe to evaluate for every group
//! - Every matching group receives the event (no first-match-wins)

pub mod matcher;

pub use matcher::{Matcher, RouteFilter, RouteList, RoutePattern};
