//! Desired-state snapshot handed to the reconciler.
//!
//! A [`DynamicConfigRoot`] is produced once per reconciliation cycle by a
//! [`ConfigBuilder`](crate::config::builder::ConfigBuilder) and is only read
//! afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::{LoadBalancingMode, RouteMatch, Transform};

/// Validated desired state for one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicConfigRoot {
    /// Desired backends keyed by backend id.
    pub backends: BTreeMap<String, DesiredBackend>,

    /// Desired routes, in declaration order.
    pub routes: Vec<Arc<DesiredRoute>>,
}

impl DynamicConfigRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, id: impl Into<String>, backend: DesiredBackend) -> Self {
        self.backends.insert(id.into(), backend);
        self
    }

    pub fn with_route(mut self, route: DesiredRoute) -> Self {
        self.routes.push(Arc::new(route));
        self
    }
}

/// Desired state of one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredBackend {
    pub endpoints: BTreeMap<String, DesiredEndpoint>,
    pub health_check: Option<HealthCheckOptions>,
    pub load_balancing: LoadBalancingMode,
}

impl DesiredBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, id: impl Into<String>, address: impl Into<String>) -> Self {
        self.endpoints.insert(
            id.into(),
            DesiredEndpoint {
                address: address.into(),
            },
        );
        self
    }

    pub fn with_health_check(mut self, options: HealthCheckOptions) -> Self {
        self.health_check = Some(options);
        self
    }

    pub fn with_load_balancing(mut self, mode: LoadBalancingMode) -> Self {
        self.load_balancing = mode;
        self
    }
}

/// Desired state of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEndpoint {
    pub address: String,
}

/// Health-check options as declared; unset fields take their defaults when
/// the runtime config is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheckOptions {
    pub enabled: Option<bool>,
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub port: Option<u16>,
    pub path: Option<String>,
}

/// Desired route descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredRoute {
    pub id: String,
    pub backend_id: Option<String>,
    pub order: i32,
    pub route_match: RouteMatch,
    pub transforms: Vec<Transform>,
    pub metadata: BTreeMap<String, String>,
}

impl DesiredRoute {
    pub fn new(id: impl Into<String>, backend_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend_id: Some(backend_id.into()),
            ..Self::default()
        }
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_match.path_prefix = Some(prefix.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.route_match.hosts.push(host.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}
