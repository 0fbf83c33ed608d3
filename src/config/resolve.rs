//! Per-group configuration resolution.
//!
//! Turns the layered config (tracker-level defaults + group overrides) into
//! one fully-resolved [`GroupSettings`] per group. Runs once at tracker
//! construction; nothing is merged at runtime.

use std::time::Duration;

use crate::config::loader::ConfigError;
use crate::config::schema::{
    RequestGroupConfig, RouteSpec, TrackerConfig, DEFAULT_DELAY_MS, DEFAULT_GROUP_NAME,
};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{RouteFilter, RouteList, RoutePattern};

/// Fully-resolved settings for one request group.
#[derive(Debug, Clone)]
pub struct GroupSettings {
    pub name: String,
    pub filter: RouteFilter,
    pub delay: Duration,
    pub timeout: Option<Duration>,
}

/// Resolve every group in configuration order, with the implicit
/// `"default"` group last.
pub fn resolve_groups(config: &TrackerConfig) -> Result<Vec<GroupSettings>, ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let explicit_default = config
        .request_groups
        .iter()
        .find(|g| g.name == DEFAULT_GROUP_NAME);

    let mut groups = config
        .request_groups
        .iter()
        .filter(|g| g.name != DEFAULT_GROUP_NAME)
        .map(|g| resolve_group(config, g))
        .collect::<Result<Vec<_>, _>>()?;

    let default_group = explicit_default
        .cloned()
        .unwrap_or_else(|| RequestGroupConfig::new(DEFAULT_GROUP_NAME));
    groups.push(resolve_group(config, &default_group)?);

    Ok(groups)
}

fn resolve_group(
    config: &TrackerConfig,
    group: &RequestGroupConfig,
) -> Result<GroupSettings, ConfigError> {
    let scope = format!("group '{}'", group.name);

    let whitelist = group
        .whitelisted_routes
        .as_ref()
        .or(config.whitelisted_routes.as_ref())
        .map(|routes| compile_routes(&scope, routes))
        .transpose()?;
    let blacklist = group
        .blacklisted_routes
        .as_ref()
        .or(config.blacklisted_routes.as_ref())
        .map(|routes| compile_routes(&scope, routes))
        .transpose()?;

    // Validation has already rejected negative values.
    let delay_ms = group
        .delay_ms
        .or(config.delay_ms)
        .unwrap_or(DEFAULT_DELAY_MS);
    let timeout_ms = group.timeout_ms.or(config.timeout_ms);

    Ok(GroupSettings {
        name: group.name.clone(),
        filter: RouteFilter::new(whitelist, blacklist),
        delay: millis(delay_ms),
        timeout: timeout_ms.map(millis),
    })
}

fn compile_routes(scope: &str, routes: &[RouteSpec]) -> Result<RouteList, ConfigError> {
    let patterns = routes
        .iter()
        .map(|route| match route {
            RouteSpec::Literal(value) => Ok(RoutePattern::literal(value.clone())),
            RouteSpec::Regex { regex } => RoutePattern::regex(regex).map_err(|e| {
                ConfigError::Validation(vec![ValidationError::InvalidPattern {
                    scope: scope.to_string(),
                    pattern: regex.clone(),
                    reason: e.to_string(),
                }])
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RouteList::new(patterns))
}

fn millis(value: i64) -> Duration {
    Duration::from_millis(value.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_group_always_present() {
        let groups = resolve_groups(&TrackerConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "default");
        assert_eq!(groups[0].delay, Duration::from_millis(200));
        assert_eq!(groups[0].timeout, None);
        assert!(groups[0].filter.is_relevant("/anything"));
    }

    #[test]
    fn test_groups_inherit_tracker_defaults() {
        let config = TrackerConfig {
            delay_ms: Some(50),
            timeout_ms: Some(1000),
            blacklisted_routes: Some(vec![RouteSpec::literal("/health")]),
            request_groups: vec![
                RequestGroupConfig::new("api").with_whitelist(vec![RouteSpec::literal("/api")]),
                RequestGroupConfig::new("slow")
                    .with_delay_ms(500)
                    .with_timeout_ms(0),
            ],
            ..TrackerConfig::default()
        };

        let groups = resolve_groups(&config).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["api", "slow", "default"]);

        let api = &groups[0];
        assert_eq!(api.delay, Duration::from_millis(50));
        assert_eq!(api.timeout, Some(Duration::from_millis(1000)));
        assert!(api.filter.is_relevant("/api/users"));
        assert!(!api.filter.is_relevant("/api/health"));
        assert!(!api.filter.is_relevant("/static/app.js"));

        let slow = &groups[1];
        assert_eq!(slow.delay, Duration::from_millis(500));
        assert_eq!(slow.timeout, Some(Duration::ZERO));

        let default = &groups[2];
        assert!(default.filter.is_relevant("/static/app.js"));
        assert!(!default.filter.is_relevant("/health"));
    }

    #[test]
    fn test_explicit_default_group_configures_implicit_one() {
        let config = TrackerConfig {
            request_groups: vec![
                RequestGroupConfig::new("default").with_delay_ms(10),
                RequestGroupConfig::new("api"),
            ],
            ..TrackerConfig::default()
        };

        let groups = resolve_groups(&config).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "api");
        assert_eq!(groups[1].name, "default");
        assert_eq!(groups[1].delay, Duration::from_millis(10));
    }

    #[test]
    fn test_group_whitelist_overrides_tracker_whitelist() {
        let config = TrackerConfig {
            whitelisted_routes: Some(vec![RouteSpec::literal("/api")]),
            request_groups: vec![
                RequestGroupConfig::new("everything").with_whitelist(vec![]),
                RequestGroupConfig::new("versioned")
                    .with_whitelist(vec![RouteSpec::regex(r"^/v\d+/")]),
            ],
            ..TrackerConfig::default()
        };

        let groups = resolve_groups(&config).unwrap();
        assert!(groups[0].filter.is_relevant("/static/app.js"));
        assert!(groups[1].filter.is_relevant("/v2/items"));
        assert!(!groups[1].filter.is_relevant("/api/items"));
        assert!(!groups[2].filter.is_relevant("/static/app.js"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TrackerConfig {
            request_groups: vec![RequestGroupConfig::new("bad").with_timeout_ms(-1)],
            ..TrackerConfig::default()
        };
        assert!(matches!(
            resolve_groups(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
