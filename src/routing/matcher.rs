//! Route matching logic.
//!
//! # Responsibilities
//! - Match a URL against a single pattern (literal substring or regex)
//! - Match a URL against a list of patterns (any-of)
//! - Decide group relevance from a whitelist/blacklist pair
//!
//! # Design Decisions
//! - Literal patterns match anywhere in the URL (substring), case-sensitive
//! - Regex patterns use unanchored search unless the pattern anchors itself
//! - Unset whitelist = allow everything; unset blacklist = forbid nothing
//! - Immutable after construction, so filters are shared freely across groups

use regex::Regex;

/// Trait for matching URLs against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &str) -> bool;
}

/// A single route pattern.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Matches when the URL contains the literal.
    Literal(String),
    /// Matches when the regex finds a match anywhere in the URL.
    Regex(Regex),
}

impl RoutePattern {
    /// Create a literal substring pattern.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Compile a regex pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Regex)
    }
}

impl Matcher for RoutePattern {
    fn matches(&self, url: &str) -> bool {
        match self {
            Self::Literal(value) => url.contains(value.as_str()),
            Self::Regex(re) => re.is_match(url),
        }
    }
}

/// Combines multiple patterns with OR semantics.
#[derive(Debug, Clone, Default)]
pub struct RouteList {
    patterns: Vec<RoutePattern>,
}

impl RouteList {
    pub fn new(patterns: Vec<RoutePattern>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Matcher for RouteList {
    fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }
}

/// Whitelist/blacklist pair deciding whether a URL belongs to a group.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    whitelist: Option<RouteList>,
    blacklist: Option<RouteList>,
}

impl RouteFilter {
    pub fn new(whitelist: Option<RouteList>, blacklist: Option<RouteList>) -> Self {
        Self {
            whitelist,
            blacklist,
        }
    }

    /// A filter that considers every URL relevant.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// True when the whitelist is unset, empty, or matches the URL.
    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.whitelist {
            Some(list) if !list.is_empty() => list.matches(url),
            _ => true,
        }
    }

    /// True when the blacklist is set and matches the URL.
    pub fn is_forbidden(&self, url: &str) -> bool {
        self.blacklist
            .as_ref()
            .map(|list| list.matches(url))
            .unwrap_or(false)
    }

    pub fn is_relevant(&self, url: &str) -> bool {
        self.is_allowed(url) && !self.is_forbidden(url)
    }
}

impl Matcher for RouteFilter {
    fn matches(&self, url: &str) -> bool {
        self.is_relevant(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(patterns: Vec<RoutePattern>) -> Option<RouteList> {
        Some(RouteList::new(patterns))
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = RoutePattern::literal("/api");
        assert!(pattern.matches("https://example.com/api/users"));
        assert!(pattern.matches("/api"));
        assert!(!pattern.matches("/API/users")); // Case sensitive
        assert!(!pattern.matches("/images/logo.png"));
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = RoutePattern::regex(r"/v[0-9]+/orders").unwrap();
        assert!(pattern.matches("https://example.com/v2/orders?page=1"));
        assert!(!pattern.matches("https://example.com/vx/orders"));

        let anchored = RoutePattern::regex(r"^/static/").unwrap();
        assert!(anchored.matches("/static/app.js"));
        assert!(!anchored.matches("https://cdn/static/app.js"));
    }

    #[test]
    fn test_invalid_regex() {
        assert!(RoutePattern::regex("(unclosed").is_err());
    }

    #[test]
    fn test_route_list_any_of() {
        let routes = RouteList::new(vec![
            RoutePattern::literal("/upload"),
            RoutePattern::regex(r"\.json$").unwrap(),
        ]);
        assert!(routes.matches("/upload/file"));
        assert!(routes.matches("/data/config.json"));
        assert!(!routes.matches("/data/config.yaml"));
    }

    #[test]
    fn test_unset_filter_allows_everything() {
        let filter = RouteFilter::allow_all();
        assert!(filter.is_allowed("/anything"));
        assert!(!filter.is_forbidden("/anything"));
        assert!(filter.is_relevant("/anything"));
    }

    #[test]
    fn test_empty_whitelist_allows_everything() {
        let filter = RouteFilter::new(list(vec![]), None);
        assert!(filter.is_relevant("/anything"));
    }

    #[test]
    fn test_empty_blacklist_forbids_nothing() {
        let filter = RouteFilter::new(None, list(vec![]));
        assert!(!filter.is_forbidden("/anything"));
    }

    #[test]
    fn test_blacklist_wins_over_whitelist() {
        let filter = RouteFilter::new(
            list(vec![RoutePattern::literal("/api")]),
            list(vec![RoutePattern::literal("/api/health")]),
        );
        assert!(filter.is_relevant("/api/users"));
        assert!(!filter.is_relevant("/api/health"));
        assert!(!filter.is_relevant("/assets/app.css"));
    }
}
