//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration structure read by the
//! configuration providers. All types derive Serde traits for deserialization
//! from TOML files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration file for the reconciler.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin introspection API settings.
    pub admin: AdminConfig,

    /// Backend definitions keyed by backend id.
    pub backends: BTreeMap<String, BackendDefinition>,

    /// Route definitions, in declaration order.
    pub routes: Vec<RouteDefinition>,
}

/// A backend and the endpoints it load-balances across.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BackendDefinition {
    /// Load-balancing policy applied by the data path.
    pub load_balancing: LoadBalancingMode,

    /// Active health-check settings. Omitted fields fall back to disabled/zero.
    pub health_check: Option<HealthCheckDefinition>,

    /// Endpoints keyed by endpoint id (unique within the backend).
    pub endpoints: BTreeMap<String, EndpointDefinition>,
}

/// A single destination of a backend.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EndpointDefinition {
    /// `host:port` or an `http(s)://` URL.
    pub address: String,
}

/// Active health-check settings for a backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct HealthCheckDefinition {
    pub enabled: Option<bool>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    /// Probe port override; the endpoint port is used when unset.
    pub port: Option<u16>,
    pub path: Option<String>,
}

/// Load-balancing policy for a backend.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingMode {
    #[default]
    PowerOfTwoChoices,
    RoundRobin,
    LeastRequests,
    Random,
    FirstAlphabetical,
}

/// Route configuration mapping requests to a backend.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteDefinition {
    /// Unique route identifier.
    pub id: String,

    /// Backend id to forward to. An unknown id is allowed: the route then
    /// matches but has nowhere to dispatch.
    #[serde(default)]
    pub backend: Option<String>,

    /// Route order (lower = evaluated first).
    #[serde(default)]
    pub order: i32,

    /// Match conditions, combined with AND semantics.
    #[serde(default, rename = "match")]
    pub route_match: RouteMatch,

    /// Request transforms, applied by the data path in declaration order.
    #[serde(default)]
    pub transforms: Vec<Transform>,

    /// Free-form metadata passed through to the data path.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A single transform: a small table of string settings, e.g.
/// `{ PathRemovePrefix = "/api" }`.
pub type Transform = BTreeMap<String, String>;

/// Match conditions for a route.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RouteMatch {
    /// Host names (case-insensitive). `*.example.com` matches any subdomain.
    pub hosts: Vec<String>,

    /// Path prefix to match (case-sensitive).
    pub path_prefix: Option<String>,

    /// HTTP methods; empty means any method.
    pub methods: Vec<String>,

    /// Header conditions; all must hold.
    pub headers: Vec<HeaderMatch>,
}

impl RouteMatch {
    /// Returns true if no condition is set.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
            && self.path_prefix.is_none()
            && self.methods.is_empty()
            && self.headers.is_empty()
    }
}

/// A header condition. With no values, the header only has to be present.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HeaderMatch {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
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
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Placeholder key shipped in the default config; must be replaced before exposing the API.
pub const DEFAULT_ADMIN_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin introspection API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: DEFAULT_ADMIN_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
