//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TrackerConfig (validated)
//!     → resolve.rs (tracker defaults + group overrides)
//!     → GroupSettings[] (one immutable struct per group)
//! ```
//!
//! # Design Decisions
//! - Groups are fixed once the tracker is built; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Layered defaults are resolved once, never merged at runtime

pub mod loader;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use resolve::{resolve_groups, GroupSettings};
pub use schema::ObservabilityConfig;
pub use schema::RequestGroupConfig;
pub use schema::RouteSpec;
pub use schema::TrackerConfig;
pub use validation::ValidationError;
