//! Runtime route and its compiled configuration.
//!
//! # Responsibilities
//! - Hold the current immutable `RouteConfig`
//! - Decide whether a desired route requires its config to be rebuilt
//!
//! # Design Decisions
//! - A `RouteConfig` remembers exactly which backend instance, backend config
//!   and endpoint configs it was built against; comparing by pointer makes
//!   the no-op check exact without deep comparisons
//! - A route whose backend did not resolve is valid and dispatches nowhere

use std::sync::Arc;

use serde::Serialize;

use crate::config::snapshot::DesiredRoute;
use crate::routing::matcher::AndMatcher;
use crate::runtime::backend::{BackendConfig, RuntimeBackend};
use crate::runtime::collection::ManagedEntity;
use crate::runtime::endpoint::EndpointConfig;
use crate::runtime::slot::ConfigSlot;

/// Dispatch-ready descriptor published in the routing table.
///
/// One descriptor exists per (route, endpoint) pair.
#[derive(Debug, Serialize)]
pub struct DispatchEndpoint {
    pub route_id: String,
    pub order: i32,
    pub backend_id: String,
    pub endpoint_id: String,
    pub address: String,
    #[serde(skip)]
    pub matcher: Arc<AndMatcher>,
    #[serde(skip)]
    pub route: Arc<DesiredRoute>,
}

/// The backend state a route config was built against.
#[derive(Debug, Clone, Default)]
pub struct BackendSnapshot {
    config: Option<Arc<BackendConfig>>,
    endpoints: Vec<(String, Arc<EndpointConfig>)>,
}

impl BackendSnapshot {
    /// Capture the current config and configured endpoints of a backend.
    pub fn capture(backend: Option<&Arc<RuntimeBackend>>) -> Self {
        let Some(backend) = backend else {
            return Self::default();
        };

        let endpoints = backend
            .endpoints()
            .items()
            .into_iter()
            .filter_map(|endpoint| {
                endpoint
                    .config()
                    .map(|config| (endpoint.id().to_string(), config))
            })
            .collect();

        Self {
            config: backend.config(),
            endpoints,
        }
    }

    pub fn config(&self) -> Option<&Arc<BackendConfig>> {
        self.config.as_ref()
    }

    pub fn endpoints(&self) -> &[(String, Arc<EndpointConfig>)] {
        &self.endpoints
    }

    /// Pointer equality of the backend config and of every endpoint config.
    fn same_as(&self, other: &BackendSnapshot) -> bool {
        let same_config = match (&self.config, &other.config) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };

        same_config
            && self.endpoints.len() == other.endpoints.len()
            && self
                .endpoints
                .iter()
                .zip(&other.endpoints)
                .all(|((id_a, a), (id_b, b))| id_a == id_b && Arc::ptr_eq(a, b))
    }
}

/// Immutable route settings, produced by a
/// [`RouteConfigBuilder`](crate::routing::builder::RouteConfigBuilder).
#[derive(Debug)]
pub struct RouteConfig {
    route: Arc<DesiredRoute>,
    backend: Option<Arc<RuntimeBackend>>,
    snapshot: BackendSnapshot,
    endpoints: Vec<Arc<DispatchEndpoint>>,
}

impl RouteConfig {
    pub fn new(
        route: Arc<DesiredRoute>,
        backend: Option<Arc<RuntimeBackend>>,
        snapshot: BackendSnapshot,
        endpoints: Vec<Arc<DispatchEndpoint>>,
    ) -> Self {
        Self {
            route,
            backend,
            snapshot,
            endpoints,
        }
    }

    /// The desired descriptor this config was built from.
    pub fn route(&self) -> &Arc<DesiredRoute> {
        &self.route
    }

    /// The resolved backend, if the route's backend id existed.
    pub fn backend(&self) -> Option<&Arc<RuntimeBackend>> {
        self.backend.as_ref()
    }

    pub fn snapshot(&self) -> &BackendSnapshot {
        &self.snapshot
    }

    /// Dispatch-ready descriptors contributed to the routing table.
    pub fn endpoints(&self) -> &[Arc<DispatchEndpoint>] {
        &self.endpoints
    }
}

/// A route, unique by id across the proxy.
#[derive(Debug)]
pub struct RuntimeRoute {
    id: String,
    config: ConfigSlot<RouteConfig>,
}

impl RuntimeRoute {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: ConfigSlot::empty(),
        }
    }

    pub fn config(&self) -> Option<Arc<RouteConfig>> {
        self.config.load()
    }

    pub(crate) fn replace_config(&self, config: Arc<RouteConfig>) {
        self.config.store(config);
    }

    /// Whether `existing` must be rebuilt for `desired` resolved against `backend`.
    ///
    /// True when there is no existing config, when the descriptor differs by
    /// value, when the resolved backend is a different instance (or appeared or
    /// disappeared), or when the backend's config or endpoint configs were
    /// replaced since `existing` was built.
    pub fn has_config_changed(
        existing: Option<&RouteConfig>,
        desired: &DesiredRoute,
        backend: Option<&Arc<RuntimeBackend>>,
    ) -> bool {
        let Some(existing) = existing else {
            return true;
        };

        if *existing.route != *desired {
            return true;
        }

        let same_backend = match (existing.backend.as_ref(), backend) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !same_backend {
            return true;
        }

        !existing.snapshot.same_as(&BackendSnapshot::capture(backend))
    }
}

impl ManagedEntity for RuntimeRoute {
    fn create(id: &str) -> Self {
        Self::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }
}
