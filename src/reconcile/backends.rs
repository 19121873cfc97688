//! Backend reconciliation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::snapshot::DesiredBackend;
use crate::reconcile::endpoints::update_runtime_endpoints;
use crate::reconcile::events::{ReconcileEvent, ReconcileObserver};
use crate::runtime::{BackendConfig, BackendManager, ManagedEntity};

/// Converge `backends` to the desired backend set.
///
/// Each backend's endpoints are reconciled before its own config is compared,
/// so events for a backend's endpoints always precede its own. An
/// endpoint-only change does not replace the backend config. A backend that
/// is no longer desired first has its endpoints removed, then is removed.
pub fn update_runtime_backends(
    desired: &BTreeMap<String, DesiredBackend>,
    backends: &BackendManager,
    observer: &dyn ReconcileObserver,
) {
    for (backend_id, desired_backend) in desired {
        backends.get_or_create(backend_id, |backend| {
            update_runtime_endpoints(backend_id, &desired_backend.endpoints, backend.endpoints(), observer);

            let current = backend.config();
            let new_config = BackendConfig::from_desired(desired_backend);
            if current.as_deref() == Some(&new_config) {
                return;
            }

            backend.replace_config(Arc::new(new_config));

            let backend_id = backend_id.clone();
            observer.on_event(&match current {
                None => ReconcileEvent::BackendAdded { backend_id },
                Some(_) => ReconcileEvent::BackendChanged { backend_id },
            });
        });
    }

    for backend in backends.items() {
        if desired.contains_key(backend.id()) {
            continue;
        }
        // Endpoints leave with their backend, each with its own event.
        update_runtime_endpoints(backend.id(), &BTreeMap::new(), backend.endpoints(), observer);
        if backends.try_remove(backend.id()) {
            observer.on_event(&ReconcileEvent::BackendRemoved {
                backend_id: backend.id().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LoadBalancingMode;
    use crate::config::snapshot::HealthCheckOptions;
    use crate::reconcile::events::RecordingObserver;
    use std::time::Duration;

    fn one(id: &str, backend: DesiredBackend) -> BTreeMap<String, DesiredBackend> {
        BTreeMap::from([(id.to_string(), backend)])
    }

    #[test]
    fn test_new_backend_adds_endpoints_first() {
        let backends = BackendManager::new();
        let observer = RecordingObserver::new();

        update_runtime_backends(
            &one("b1", DesiredBackend::new().with_endpoint("e1", "10.0.0.1:80")),
            &backends,
            &observer,
        );

        assert_eq!(
            observer.take(),
            vec![
                ReconcileEvent::EndpointAdded {
                    backend_id: "b1".into(),
                    endpoint_id: "e1".into()
                },
                ReconcileEvent::BackendAdded { backend_id: "b1".into() },
            ]
        );
        let b1 = backends.try_get("b1").unwrap();
        assert_eq!(b1.config().unwrap().health_check.interval, Duration::ZERO);
        assert_eq!(b1.endpoints().len(), 1);
    }

    #[test]
    fn test_field_change_swaps_config() {
        let backends = BackendManager::new();
        let observer = RecordingObserver::new();
        let base = DesiredBackend::new().with_endpoint("e1", "10.0.0.1:80");

        update_runtime_backends(&one("b1", base.clone()), &backends, &observer);
        let b1 = backends.try_get("b1").unwrap();
        let first = b1.config().unwrap();
        observer.take();

        let changed = base.clone().with_health_check(HealthCheckOptions {
            enabled: Some(true),
            port: Some(8080),
            ..Default::default()
        });
        update_runtime_backends(&one("b1", changed), &backends, &observer);
        assert_eq!(
            observer.take(),
            vec![ReconcileEvent::BackendChanged { backend_id: "b1".into() }]
        );
        let second = b1.config().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.health_check.port, 8080);
        // The old config is untouched.
        assert!(!first.health_check.enabled);

        let lb = base.with_load_balancing(LoadBalancingMode::RoundRobin);
        update_runtime_backends(&one("b1", lb), &backends, &observer);
        assert_eq!(
            observer.take(),
            vec![ReconcileEvent::BackendChanged { backend_id: "b1".into() }]
        );
    }

    #[test]
    fn test_explicit_defaults_are_noop() {
        let backends = BackendManager::new();
        let observer = RecordingObserver::new();

        update_runtime_backends(&one("b1", DesiredBackend::new()), &backends, &observer);
        let before = backends.try_get("b1").unwrap().config().unwrap();
        observer.take();

        let explicit = DesiredBackend::new().with_health_check(HealthCheckOptions {
            enabled: Some(false),
            interval: Some(Duration::ZERO),
            path: Some(String::new()),
            ..Default::default()
        });
        update_runtime_backends(&one("b1", explicit), &backends, &observer);

        assert!(observer.events().is_empty());
        assert!(Arc::ptr_eq(&before, &backends.try_get("b1").unwrap().config().unwrap()));
    }

    #[test]
    fn test_endpoint_only_change_keeps_backend_config() {
        let backends = BackendManager::new();
        let observer = RecordingObserver::new();

        update_runtime_backends(&one("b1", DesiredBackend::new().with_endpoint("e1", "10.0.0.1:80")), &backends, &observer);
        let before = backends.try_get("b1").unwrap().config().unwrap();
        observer.take();

        update_runtime_backends(&one("b1", DesiredBackend::new().with_endpoint("e1", "10.0.0.2:80")), &backends, &observer);

        assert_eq!(
            observer.take(),
            vec![ReconcileEvent::EndpointChanged {
                backend_id: "b1".into(),
                endpoint_id: "e1".into()
            }]
        );
        assert!(Arc::ptr_eq(&before, &backends.try_get("b1").unwrap().config().unwrap()));
    }

    #[test]
    fn test_removed_backend_and_recreation() {
        let backends = BackendManager::new();
        let observer = RecordingObserver::new();
        let desired = one("b1", DesiredBackend::new().with_endpoint("e1", "10.0.0.1:80"));

        update_runtime_backends(&desired, &backends, &observer);
        let old = backends.try_get("b1").unwrap();
        observer.take();

        let old_endpoint = old.endpoints().try_get("e1").unwrap();

        update_runtime_backends(&BTreeMap::new(), &backends, &observer);
        assert_eq!(
            observer.take(),
            vec![
                ReconcileEvent::EndpointRemoved {
                    backend_id: "b1".into(),
                    endpoint_id: "e1".into()
                },
                ReconcileEvent::BackendRemoved { backend_id: "b1".into() },
            ]
        );
        assert!(backends.is_empty());
        // Still readable by whoever held them.
        assert!(old.config().is_some());
        assert_eq!(old_endpoint.config().unwrap().address, "10.0.0.1:80");

        update_runtime_backends(&desired, &backends, &observer);
        let fresh = backends.try_get("b1").unwrap();
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert_eq!(observer.take().len(), 2);
    }
}
