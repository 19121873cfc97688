//! Reconciliation entry point.
//!
//! # Responsibilities
//! - Ask the config builder for validated desired state
//! - Reconcile backends (and their endpoints), then routes, in that order
//! - Leave runtime state untouched when the desired state is rejected
//!
//! # Design Decisions
//! - The manager owns no global state: the registries, the route config
//!   builder, the publisher and the observer are all handed in
//! - Cancellation is checked before any runtime state is touched, never mid-diff
//! - Callers serialize `apply_configurations`; see `task.rs`

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::builder::{BuildError, ConfigBuilder, ErrorReporter};
use crate::observability::metrics;
use crate::reconcile::backends::update_runtime_backends;
use crate::reconcile::events::{ReconcileObserver, TracingObserver};
use crate::reconcile::routes::update_runtime_routes;
use crate::routing::{DefaultRouteConfigBuilder, RouteConfigBuilder, RouteTablePublisher};
use crate::runtime::{BackendManager, RouteManager};

/// Applies desired state to the runtime model.
pub struct ConfigManager {
    builder: Box<dyn ConfigBuilder>,
    backends: Arc<BackendManager>,
    routes: Arc<RouteManager>,
    route_config_builder: Arc<dyn RouteConfigBuilder>,
    publisher: Arc<dyn RouteTablePublisher>,
    observer: Arc<dyn ReconcileObserver>,
    cancellation: CancellationToken,
}

impl ConfigManager {
    /// Create a manager using the default route config builder and a
    /// logging observer.
    pub fn new(
        builder: impl ConfigBuilder + 'static,
        backends: Arc<BackendManager>,
        routes: Arc<RouteManager>,
        publisher: Arc<dyn RouteTablePublisher>,
    ) -> Self {
        Self {
            builder: Box::new(builder),
            backends,
            routes,
            route_config_builder: Arc::new(DefaultRouteConfigBuilder),
            publisher,
            observer: Arc::new(TracingObserver),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_route_config_builder(mut self, builder: Arc<dyn RouteConfigBuilder>) -> Self {
        self.route_config_builder = builder;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn backends(&self) -> &Arc<BackendManager> {
        &self.backends
    }

    pub fn routes(&self) -> &Arc<RouteManager> {
        &self.routes
    }

    /// Token that aborts an in-flight config build.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Build desired state and converge the runtime model to it.
    ///
    /// Returns false, without touching runtime state, if the desired state
    /// could not be built or the build was cancelled. The previously
    /// published routing table then stays authoritative.
    pub async fn apply_configurations(&self, errors: &dyn ErrorReporter) -> bool {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("apply_configurations", %cycle_id);
        self.apply(errors).instrument(span).await
    }

    async fn apply(&self, errors: &dyn ErrorReporter) -> bool {
        let config = match self.builder.build_config(errors, &self.cancellation).await {
            Ok(config) => config,
            Err(BuildError::Cancelled) => {
                tracing::info!("Configuration build cancelled");
                metrics::record_apply("cancelled");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Configuration rejected, keeping current state");
                metrics::record_apply("rejected");
                return false;
            }
        };

        if self.cancellation.is_cancelled() {
            tracing::info!("Cancelled before reconciliation");
            metrics::record_apply("cancelled");
            return false;
        }

        update_runtime_backends(&config.backends, &self.backends, self.observer.as_ref());

        let published = update_runtime_routes(
            &config.routes,
            &self.backends,
            &self.routes,
            self.route_config_builder.as_ref(),
            self.publisher.as_ref(),
            self.observer.as_ref(),
        );

        tracing::info!(
            backends = config.backends.len(),
            routes = config.routes.len(),
            published,
            "Configuration applied"
        );
        metrics::record_apply("applied");
        true
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("backends", &self.backends)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}
