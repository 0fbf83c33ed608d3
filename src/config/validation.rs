//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays and timeouts non-negative)
//! - Detect group name collisions
//! - Check that every regex route compiles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TrackerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{RouteSpec, TrackerConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{scope}: delay_ms must not be negative (got {value})")]
    NegativeDelay { scope: String, value: i64 },

    #[error("{scope}: timeout_ms must not be negative (got {value})")]
    NegativeTimeout { scope: String, value: i64 },

    #[error("request group #{index} has an empty name")]
    EmptyGroupName { index: usize },

    #[error("request group '{name}' is defined more than once")]
    DuplicateGroup { name: String },

    #[error("{scope}: invalid route regex '{pattern}': {reason}")]
    InvalidPattern {
        scope: String,
        pattern: String,
        reason: String,
    },

    #[error("event_capacity must be greater than zero")]
    ZeroEventCapacity,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_durations("tracker", config.delay_ms, config.timeout_ms, &mut errors);
    check_routes("tracker", config.whitelisted_routes.as_deref(), &mut errors);
    check_routes("tracker", config.blacklisted_routes.as_deref(), &mut errors);

    if config.event_capacity == 0 {
        errors.push(ValidationError::ZeroEventCapacity);
    }

    let mut seen = HashSet::new();
    for (index, group) in config.request_groups.iter().enumerate() {
        if group.name.trim().is_empty() {
            errors.push(ValidationError::EmptyGroupName { index });
            continue;
        }
        if !seen.insert(group.name.as_str()) {
            errors.push(ValidationError::DuplicateGroup {
                name: group.name.clone(),
            });
        }

        let scope = format!("group '{}'", group.name);
        check_durations(&scope, group.delay_ms, group.timeout_ms, &mut errors);
        check_routes(&scope, group.whitelisted_routes.as_deref(), &mut errors);
        check_routes(&scope, group.blacklisted_routes.as_deref(), &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_durations(
    scope: &str,
    delay_ms: Option<i64>,
    timeout_ms: Option<i64>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(value) = delay_ms.filter(|v| *v < 0) {
        errors.push(ValidationError::NegativeDelay {
            scope: scope.to_string(),
            value,
        });
    }
    if let Some(value) = timeout_ms.filter(|v| *v < 0) {
        errors.push(ValidationError::NegativeTimeout {
            scope: scope.to_string(),
            value,
        });
    }
}

fn check_routes(scope: &str, routes: Option<&[RouteSpec]>, errors: &mut Vec<ValidationError>) {
    for route in routes.unwrap_or_default() {
        if let RouteSpec::Regex { regex } = route {
            if let Err(e) = Regex::new(regex) {
                errors.push(ValidationError::InvalidPattern {
                    scope: scope.to_string(),
                    pattern: regex.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}
