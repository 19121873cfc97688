//! Route reconciliation and routing-table publication.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::snapshot::DesiredRoute;
use crate::reconcile::events::{ReconcileEvent, ReconcileObserver};
use crate::routing::{RouteConfigBuilder, RouteTablePublisher};
use crate::runtime::{BackendManager, DispatchEndpoint, ManagedEntity, RouteManager, RuntimeRoute};

/// Converge `routes` to the desired route list and republish the routing
/// table if anything changed.
///
/// Must run after backends have been reconciled for the same cycle: each
/// route resolves its backend against `backends` as it is now. A backend id
/// that does not resolve is not an error; the route is kept with no
/// dispatch endpoints.
///
/// Returns true if the table was published.
pub fn update_runtime_routes(
    desired: &[Arc<DesiredRoute>],
    backends: &BackendManager,
    routes: &RouteManager,
    builder: &dyn RouteConfigBuilder,
    publisher: &dyn RouteTablePublisher,
    observer: &dyn ReconcileObserver,
) -> bool {
    let mut changed = false;
    let mut desired_ids = HashSet::with_capacity(desired.len());

    for route in desired {
        desired_ids.insert(route.id.as_str());
        let backend = route.backend_id.as_deref().and_then(|id| backends.try_get(id));

        routes.get_or_create(&route.id, |runtime_route| {
            let current = runtime_route.config();
            if !RuntimeRoute::has_config_changed(current.as_deref(), route, backend.as_ref()) {
                return;
            }

            let config = builder.build(route, backend.as_ref(), runtime_route);
            runtime_route.replace_config(Arc::new(config));
            changed = true;

            let route_id = route.id.clone();
            observer.on_event(&match current {
                None => ReconcileEvent::RouteAdded { route_id },
                Some(_) => ReconcileEvent::RouteChanged { route_id },
            });
        });
    }

    for route in routes.items() {
        if desired_ids.contains(route.id()) {
            continue;
        }
        if routes.try_remove(route.id()) {
            changed = true;
            observer.on_event(&ReconcileEvent::RouteRemoved {
                route_id: route.id().to_string(),
            });
        }
    }

    if changed {
        let table: Vec<Arc<DispatchEndpoint>> = routes
            .items()
            .iter()
            .filter_map(|route| route.config())
            .flat_map(|config| config.endpoints().to_vec())
            .collect();
        publisher.publish(table);
    }

    changed
}
