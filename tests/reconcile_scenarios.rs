//! End-to-end reconciliation scenarios: TOML in, runtime model and routing
//! table out.

use std::sync::Arc;

use axum::http::Request;
use proxy_reconciler::config::{CollectingErrorReporter, ValidationError};
use proxy_reconciler::reconcile::ReconcileEvent;

mod common;
use common::{Harness, BASE_CONFIG};

fn backend_added(id: &str) -> ReconcileEvent {
    ReconcileEvent::BackendAdded { backend_id: id.into() }
}

fn endpoint_added(backend_id: &str, endpoint_id: &str) -> ReconcileEvent {
    ReconcileEvent::EndpointAdded {
        backend_id: backend_id.into(),
        endpoint_id: endpoint_id.into(),
    }
}

fn endpoint_removed(backend_id: &str, endpoint_id: &str) -> ReconcileEvent {
    ReconcileEvent::EndpointRemoved {
        backend_id: backend_id.into(),
        endpoint_id: endpoint_id.into(),
    }
}

#[tokio::test]
async fn test_first_apply_then_identical_apply_is_noop() {
    let harness = Harness::new(BASE_CONFIG);
    let reporter = CollectingErrorReporter::new();

    assert!(harness.manager.apply_configurations(&reporter).await);
    assert!(reporter.is_empty());
    assert_eq!(
        harness.observer.take(),
        vec![
            endpoint_added("b1", "e1"),
            backend_added("b1"),
            ReconcileEvent::RouteAdded { route_id: "r1".into() },
        ]
    );

    let table = harness.table.snapshot();
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].route_id, "r1");
    assert_eq!(table[0].backend_id, "b1");
    assert_eq!(table[0].endpoint_id, "e1");
    assert_eq!(table[0].address, "10.0.0.1:80");

    let backend = harness.manager.backends().try_get("b1").unwrap();
    assert!(!backend.config().unwrap().health_check.enabled);
    let route_config = harness.manager.routes().try_get("r1").unwrap().config().unwrap();

    // Same desired state again, rebuilt from scratch by the builder.
    assert!(harness.manager.apply_configurations(&reporter).await);
    assert!(harness.observer.events().is_empty());
    assert!(Arc::ptr_eq(&table, &harness.table.snapshot()));
    assert_eq!(harness.table.version(), 1);
    assert!(Arc::ptr_eq(
        &route_config,
        &harness.manager.routes().try_get("r1").unwrap().config().unwrap()
    ));
}

#[tokio::test]
async fn test_removed_backend_leaves_route_without_endpoints() {
    let harness = Harness::new(BASE_CONFIG);
    let reporter = CollectingErrorReporter::new();
    assert!(harness.manager.apply_configurations(&reporter).await);
    harness.observer.take();
    let old_backend = harness.manager.backends().try_get("b1").unwrap();

    harness.update(
        r#"
        [[routes]]
        id = "r1"
        backend = "b1"

        [routes.match]
        path_prefix = "/"
        "#,
    );
    assert!(harness.manager.apply_configurations(&reporter).await);

    assert_eq!(
        harness.observer.take(),
        vec![
            endpoint_removed("b1", "e1"),
            ReconcileEvent::BackendRemoved { backend_id: "b1".into() },
            ReconcileEvent::RouteChanged { route_id: "r1".into() },
        ]
    );
    assert!(harness.manager.backends().is_empty());

    let route = harness.manager.routes().try_get("r1").unwrap().config().unwrap();
    assert!(route.backend().is_none());
    assert!(route.endpoints().is_empty());
    assert!(harness.table.snapshot().is_empty());
    assert_eq!(harness.table.version(), 2);

    // A reader still holding the removed backend keeps a usable value.
    assert_eq!(old_backend.endpoints().len(), 0);
    assert!(old_backend.config().is_some());
}

#[tokio::test]
async fn test_match_change_rebuilds_route_only() {
    let harness = Harness::new(BASE_CONFIG);
    let reporter = CollectingErrorReporter::new();
    assert!(harness.manager.apply_configurations(&reporter).await);
    harness.observer.take();
    let backend_config = harness.manager.backends().try_get("b1").unwrap().config().unwrap();

    harness.update(
        r#"
        [backends.b1.endpoints.e1]
        address = "10.0.0.1:80"

        [[routes]]
        id = "r1"
        backend = "b1"

        [routes.match]
        path_prefix = "/api"
        "#,
    );
    assert!(harness.manager.apply_configurations(&reporter).await);

    assert_eq!(
        harness.observer.take(),
        vec![ReconcileEvent::RouteChanged { route_id: "r1".into() }]
    );
    assert!(Arc::ptr_eq(
        &backend_config,
        &harness.manager.backends().try_get("b1").unwrap().config().unwrap()
    ));
    assert_eq!(harness.table.version(), 2);

    let (api, _) = Request::builder().uri("/api/users").body(()).unwrap().into_parts();
    let (root, _) = Request::builder().uri("/other").body(()).unwrap().into_parts();
    assert_eq!(harness.table.select(&api).unwrap().route_id, "r1");
    assert!(harness.table.select(&root).is_none());
}

#[tokio::test]
async fn test_endpoint_address_change_reaches_table() {
    let harness = Harness::new(BASE_CONFIG);
    let reporter = CollectingErrorReporter::new();
    assert!(harness.manager.apply_configurations(&reporter).await);
    harness.observer.take();

    harness.update(&BASE_CONFIG.replace("10.0.0.1:80", "10.0.0.2:8080"));
    assert!(harness.manager.apply_configurations(&reporter).await);

    assert_eq!(
        harness.observer.take(),
        vec![
            ReconcileEvent::EndpointChanged {
                backend_id: "b1".into(),
                endpoint_id: "e1".into()
            },
            ReconcileEvent::RouteChanged { route_id: "r1".into() },
        ]
    );
    assert_eq!(harness.table.snapshot()[0].address, "10.0.0.2:8080");
}

#[tokio::test]
async fn test_invalid_config_keeps_previous_state() {
    let harness = Harness::new(BASE_CONFIG);
    let reporter = CollectingErrorReporter::new();
    assert!(harness.manager.apply_configurations(&reporter).await);
    harness.observer.take();
    let table = harness.table.snapshot();

    harness.update(&BASE_CONFIG.replace("10.0.0.1:80", "not an address"));
    assert!(!harness.manager.apply_configurations(&reporter).await);

    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ValidationError::InvalidEndpointAddress { backend_id, endpoint_id, .. }
            if backend_id == "b1" && endpoint_id == "e1"
    ));
    assert!(harness.observer.events().is_empty());
    assert!(Arc::ptr_eq(&table, &harness.table.snapshot()));
    let endpoint = harness
        .manager
        .backends()
        .try_get("b1")
        .and_then(|b| b.endpoints().try_get("e1"))
        .unwrap();
    assert_eq!(endpoint.config().unwrap().address, "10.0.0.1:80");
}

#[tokio::test]
async fn test_lower_order_wins_across_routes() {
    let harness = Harness::new(
        r#"
        [backends.web.endpoints.w1]
        address = "10.0.1.1:80"

        [backends.api.endpoints.a1]
        address = "10.0.2.1:80"

        [backends.api.endpoints.a2]
        address = "10.0.2.2:80"

        [[routes]]
        id = "catch-all"
        backend = "web"
        order = 100

        [routes.match]
        path_prefix = "/"

        [[routes]]
        id = "api"
        backend = "api"
        order = 1

        [routes.match]
        path_prefix = "/api"
        methods = ["get"]
        "#,
    );
    assert!(harness.manager.apply_configurations(&CollectingErrorReporter::new()).await);
    assert_eq!(harness.table.snapshot().len(), 3);

    let (get, _) = Request::builder().uri("/api/v1").body(()).unwrap().into_parts();
    let selection = harness.table.select(&get).unwrap();
    assert_eq!(selection.route_id, "api");
    let addresses: Vec<_> = selection.endpoints.iter().map(|d| d.address.as_str()).collect();
    assert_eq!(addresses, vec!["10.0.2.1:80", "10.0.2.2:80"]);

    let (post, _) = Request::builder()
        .method("POST")
        .uri("/api/v1")
        .body(())
        .unwrap()
        .into_parts();
    assert_eq!(harness.table.select(&post).unwrap().route_id, "catch-all");
}
