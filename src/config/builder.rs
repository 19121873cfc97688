//! Desired-state construction.
//!
//! The config builder turns the provider's raw [`ProxyConfig`] into a
//! validated [`DynamicConfigRoot`]. Every semantic problem is reported through
//! an [`ErrorReporter`] before the build fails, so a bad entry can be
//! diagnosed without digging through logs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::provider::ConfigProvider;
use crate::config::schema::{BackendDefinition, ProxyConfig, RouteDefinition, RouteMatch};
use crate::config::snapshot::{
    DesiredBackend, DesiredEndpoint, DesiredRoute, DynamicConfigRoot, HealthCheckOptions,
};
use crate::config::validation::{validate_config, ValidationError};

/// Why a desired-state snapshot could not be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("configuration has {count} error(s)")]
    Invalid { count: usize },

    #[error("configuration build cancelled")]
    Cancelled,
}

/// Receives the granular errors found while building desired state.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &ValidationError);
}

/// Reports errors to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorReporter;

impl ErrorReporter for LogErrorReporter {
    fn report(&self, error: &ValidationError) {
        tracing::error!(error = %error, "Invalid configuration entry");
    }
}

/// Keeps every reported error.
#[derive(Debug, Default)]
pub struct CollectingErrorReporter {
    errors: Mutex<Vec<ValidationError>>,
}

impl CollectingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.errors.lock().expect("error reporter mutex poisoned").clone()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().expect("error reporter mutex poisoned").is_empty()
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report(&self, error: &ValidationError) {
        self.errors
            .lock()
            .expect("error reporter mutex poisoned")
            .push(error.clone());
    }
}

/// Produces the desired state for one reconciliation cycle.
#[async_trait]
pub trait ConfigBuilder: Send + Sync {
    /// Build a validated snapshot.
    ///
    /// Ordinary validation failures are reported through `errors` and
    /// returned as [`BuildError::Invalid`], never as a panic.
    async fn build_config(
        &self,
        errors: &dyn ErrorReporter,
        cancellation: &CancellationToken,
    ) -> Result<DynamicConfigRoot, BuildError>;
}

/// Builds desired state from a [`ConfigProvider`].
#[derive(Debug)]
pub struct ProviderConfigBuilder<P> {
    provider: Arc<P>,
}

impl<P: ConfigProvider> ProviderConfigBuilder<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }
}

#[async_trait]
impl<P: ConfigProvider> ConfigBuilder for ProviderConfigBuilder<P> {
    async fn build_config(
        &self,
        errors: &dyn ErrorReporter,
        cancellation: &CancellationToken,
    ) -> Result<DynamicConfigRoot, BuildError> {
        if cancellation.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        let config = self.provider.current();
        if let Err(found) = validate_config(&config) {
            for error in &found {
                errors.report(error);
            }
            return Err(BuildError::Invalid { count: found.len() });
        }

        Ok(build_snapshot(&config))
    }
}

/// Convert an already validated configuration into desired state.
pub fn build_snapshot(config: &ProxyConfig) -> DynamicConfigRoot {
    DynamicConfigRoot {
        backends: config
            .backends
            .iter()
            .map(|(id, backend)| (id.clone(), build_backend(backend)))
            .collect(),
        routes: config.routes.iter().map(|r| Arc::new(build_route(r))).collect(),
    }
}

fn build_backend(backend: &BackendDefinition) -> DesiredBackend {
    let endpoints: BTreeMap<String, DesiredEndpoint> = backend
        .endpoints
        .iter()
        .map(|(id, endpoint)| {
            (
                id.clone(),
                DesiredEndpoint {
                    address: endpoint.address.trim().to_string(),
                },
            )
        })
        .collect();

    DesiredBackend {
        endpoints,
        health_check: backend.health_check.as_ref().map(|hc| HealthCheckOptions {
            enabled: hc.enabled,
            interval: hc.interval_secs.map(Duration::from_secs),
            timeout: hc.timeout_secs.map(Duration::from_secs),
            port: hc.port,
            path: hc.path.clone(),
        }),
        load_balancing: backend.load_balancing,
    }
}

fn build_route(route: &RouteDefinition) -> DesiredRoute {
    let route_match = RouteMatch {
        hosts: route
            .route_match
            .hosts
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect(),
        path_prefix: route.route_match.path_prefix.clone(),
        methods: route
            .route_match
            .methods
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect(),
        headers: route.route_match.headers.clone(),
    };

    DesiredRoute {
        id: route.id.clone(),
        backend_id: route.backend.clone().filter(|b| !b.is_empty()),
        order: route.order,
        route_match,
        transforms: route.transforms.clone(),
        metadata: route.metadata.clone(),
    }
}
