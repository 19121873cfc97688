//! Route matching logic.
//!
//! # Responsibilities
//! - Match host header (exact or `*.` wildcard, case-insensitive)
//! - Match path prefix (case-sensitive)
//! - Match method and header conditions
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive and ignores the port
//! - Path matching is case-sensitive
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{HeaderName, Method};

use crate::config::schema::RouteMatch;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Parts) -> bool;
}

/// Matches the Host header against a set of host patterns.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    hosts: Vec<String>,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// Hosts are normalized to lowercase for case-insensitive matching.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(|h| h.into().to_lowercase()).collect(),
        }
    }

    fn host_matches(pattern: &str, host: &str) -> bool {
        match pattern.strip_prefix("*.") {
            Some(suffix) => host
                .strip_suffix(suffix)
                .is_some_and(|label| label.len() > 1 && label.ends_with('.')),
            None => pattern == host,
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Parts) -> bool {
        let host = req
            .headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri.host());
        let Some(host) = host else {
            return false;
        };
        // Strip the port, keeping bracketed IPv6 literals intact.
        let host = match host.rfind(':') {
            Some(i) if !host[i..].contains(']') => &host[..i],
            _ => host,
        };
        let host = host.to_lowercase();
        self.hosts.iter().any(|p| Self::host_matches(p, &host))
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Parts) -> bool {
        req.uri.path().starts_with(&self.prefix)
    }
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    /// Unknown method names are skipped; validation rejects them earlier.
    pub fn new<'a>(methods: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            methods: methods
                .into_iter()
                .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
                .collect(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Parts) -> bool {
        self.methods.contains(&req.method)
    }
}

/// Matches a header by presence, or by exact value if values are given.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: HeaderName,
    values: Vec<String>,
}

impl HeaderMatcher {
    /// Returns None if `name` is not a valid header name.
    pub fn new(name: &str, values: Vec<String>) -> Option<Self> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        Some(Self { name, values })
    }
}

impl Matcher for HeaderMatcher {
    fn matches(&self, req: &Parts) -> bool {
        let mut present = req.headers.get_all(&self.name).iter().peekable();
        if self.values.is_empty() {
            return present.peek().is_some();
        }
        present
            .filter_map(|v| v.to_str().ok())
            .any(|v| self.values.iter().any(|expected| expected == v))
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Parts) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

/// Compile a route's match conditions.
pub fn compile(route_match: &RouteMatch) -> AndMatcher {
    let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();

    if !route_match.hosts.is_empty() {
        matchers.push(Box::new(HostMatcher::new(route_match.hosts.iter().cloned())));
    }
    if let Some(prefix) = &route_match.path_prefix {
        matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
    }
    if !route_match.methods.is_empty() {
        matchers.push(Box::new(MethodMatcher::new(
            route_match.methods.iter().map(String::as_str),
        )));
    }
    for header in &route_match.headers {
        match HeaderMatcher::new(&header.name, header.values.clone()) {
            Some(matcher) => matchers.push(Box::new(matcher)),
            None => tracing::warn!(header = %header.name, "Skipping invalid header name in route match"),
        }
    }

    AndMatcher::new(matchers)
}
