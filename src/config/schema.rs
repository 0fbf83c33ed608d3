//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tracker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default debounce delay in milliseconds.
pub const DEFAULT_DELAY_MS: i64 = 200;

/// Name of the implicit catch-all group.
pub const DEFAULT_GROUP_NAME: &str = "default";

/// Root configuration for the request tracker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Routes a URL must match to be tracked (unset = all routes).
    pub whitelisted_routes: Option<Vec<RouteSpec>>,

    /// Routes excluded from tracking even when whitelisted.
    pub blacklisted_routes: Option<Vec<RouteSpec>>,

    /// Debounce delay before a busy signal may fire, in milliseconds.
    pub delay_ms: Option<i64>,

    /// Per-request hang threshold in milliseconds (unset = no timeout).
    pub timeout_ms: Option<i64>,

    /// Named groups; unset fields inherit the tracker-level values above.
    pub request_groups: Vec<RequestGroupConfig>,

    /// Signals buffered per subscriber before it starts lagging.
    pub event_capacity: usize,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            whitelisted_routes: None,
            blacklisted_routes: None,
            delay_ms: None,
            timeout_ms: None,
            request_groups: Vec::new(),
            event_capacity: 256,
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Configuration for one named request group.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestGroupConfig {
    /// Group identifier used in every emitted signal.
    pub name: String,

    #[serde(default)]
    pub whitelisted_routes: Option<Vec<RouteSpec>>,

    #[serde(default)]
    pub blacklisted_routes: Option<Vec<RouteSpec>>,

    #[serde(default)]
    pub delay_ms: Option<i64>,

    #[serde(default)]
    pub timeout_ms: Option<i64>,
}

impl RequestGroupConfig {
    /// Create a group that inherits everything from the tracker level.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_whitelist(mut self, routes: Vec<RouteSpec>) -> Self {
        self.whitelisted_routes = Some(routes);
        self
    }

    pub fn with_blacklist(mut self, routes: Vec<RouteSpec>) -> Self {
        self.blacklisted_routes = Some(routes);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: i64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// A route entry as written in config: a bare string is a literal
/// substring, a `{ regex = "..." }` table is a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RouteSpec {
    Literal(String),
    Regex { regex: String },
}

impl RouteSpec {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            regex: pattern.into(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: TrackerConfig = toml::from_str(
            r#"
            delay_ms = 100
            timeout_ms = 5000
            whitelisted_routes = ["/api", { regex = "^/v[0-9]+/" }]
            event_capacity = 32

            [[request_groups]]
            name = "uploads"
            whitelisted_routes = ["/upload"]
            timeout_ms = 30000

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.delay_ms, Some(100));
        assert_eq!(config.timeout_ms, Some(5000));
        assert_eq!(
            config.whitelisted_routes,
            Some(vec![RouteSpec::literal("/api"), RouteSpec::regex("^/v[0-9]+/")])
        );
        assert_eq!(config.event_capacity, 32);
        assert_eq!(config.request_groups.len(), 1);
        assert_eq!(config.request_groups[0].name, "uploads");
        assert_eq!(config.request_groups[0].delay_ms, None);
        assert_eq!(config.request_groups[0].timeout_ms, Some(30000));
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: TrackerConfig = toml::from_str("").unwrap();
        assert!(config.whitelisted_routes.is_none());
        assert!(config.delay_ms.is_none());
        assert!(config.request_groups.is_empty());
        assert_eq!(config.event_capacity, 256);
    }
}
