//! Endpoint reconciliation for one backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::snapshot::DesiredEndpoint;
use crate::reconcile::events::{ReconcileEvent, ReconcileObserver};
use crate::runtime::{EndpointConfig, EndpointManager, ManagedEntity};

/// Converge `endpoints` (owned by `backend_id`) to the desired endpoint set.
pub fn update_runtime_endpoints(
    backend_id: &str,
    desired: &BTreeMap<String, DesiredEndpoint>,
    endpoints: &EndpointManager,
    observer: &dyn ReconcileObserver,
) {
    for (endpoint_id, desired_endpoint) in desired {
        endpoints.get_or_create(endpoint_id, |endpoint| {
            let current = endpoint.config();
            if current.as_ref().map(|c| c.address.as_str()) == Some(desired_endpoint.address.as_str()) {
                return;
            }

            endpoint.replace_config(Arc::new(EndpointConfig::new(desired_endpoint.address.clone())));

            let backend_id = backend_id.to_string();
            let endpoint_id = endpoint_id.clone();
            observer.on_event(&match current {
                None => ReconcileEvent::EndpointAdded { backend_id, endpoint_id },
                Some(_) => ReconcileEvent::EndpointChanged { backend_id, endpoint_id },
            });
        });
    }

    // Iterating a snapshot, so removal is safe.
    for endpoint in endpoints.items() {
        if desired.contains_key(endpoint.id()) {
            continue;
        }
        if endpoints.try_remove(endpoint.id()) {
            observer.on_event(&ReconcileEvent::EndpointRemoved {
                backend_id: backend_id.to_string(),
                endpoint_id: endpoint.id().to_string(),
            });
        }
    }
}
