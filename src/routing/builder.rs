//! Route config construction.
//!
//! Turns a desired route plus its resolved backend into the immutable
//! [`RouteConfig`] stored on the runtime route.

use std::sync::Arc;

use crate::config::snapshot::DesiredRoute;
use crate::routing::matcher;
use crate::runtime::{
    BackendSnapshot, DispatchEndpoint, ManagedEntity, RouteConfig, RuntimeBackend, RuntimeRoute,
};

/// Builds a route's runtime config.
///
/// Implementations must be pure functions of their inputs and must not keep
/// references into the runtime route.
pub trait RouteConfigBuilder: Send + Sync {
    fn build(
        &self,
        route: &Arc<DesiredRoute>,
        backend: Option<&Arc<RuntimeBackend>>,
        runtime_route: &RuntimeRoute,
    ) -> RouteConfig;
}

/// Compiles the match conditions once and emits one dispatch descriptor per
/// configured endpoint of the resolved backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRouteConfigBuilder;

impl RouteConfigBuilder for DefaultRouteConfigBuilder {
    fn build(
        &self,
        route: &Arc<DesiredRoute>,
        backend: Option<&Arc<RuntimeBackend>>,
        runtime_route: &RuntimeRoute,
    ) -> RouteConfig {
        let snapshot = BackendSnapshot::capture(backend);
        let endpoints = match backend {
            Some(backend) => {
                let matcher = Arc::new(matcher::compile(&route.route_match));
                snapshot
                    .endpoints()
                    .iter()
                    .map(|(endpoint_id, config)| {
                        Arc::new(DispatchEndpoint {
                            route_id: runtime_route.id().to_string(),
                            order: route.order,
                            backend_id: backend.id().to_string(),
                            endpoint_id: endpoint_id.clone(),
                            address: config.address.clone(),
                            matcher: Arc::clone(&matcher),
                            route: Arc::clone(route),
                        })
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        RouteConfig::new(Arc::clone(route), backend.cloned(), snapshot, endpoints)
    }
}
