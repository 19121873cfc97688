//! Runtime backend.
//!
//! # Responsibilities
//! - Hold the current immutable `BackendConfig` (health check + load balancing)
//! - Own the endpoint registry scoped to this backend
//!
//! # Design Decisions
//! - Config is replaced as a whole, never patched field by field
//! - Unset health-check options default to disabled/zero/empty

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::schema::LoadBalancingMode;
use crate::config::snapshot::DesiredBackend;
use crate::runtime::collection::ManagedEntity;
use crate::runtime::slot::ConfigSlot;
use crate::runtime::EndpointManager;

/// Active health-check settings consumed by the health checker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthCheckConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub timeout: Duration,
    pub port: u16,
    pub path: String,
}

/// Immutable backend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackendConfig {
    pub health_check: HealthCheckConfig,
    pub load_balancing: LoadBalancingMode,
}

impl BackendConfig {
    /// Build the runtime config for a desired backend, applying defaults.
    pub fn from_desired(desired: &DesiredBackend) -> Self {
        let health_check = match &desired.health_check {
            Some(options) => HealthCheckConfig {
                enabled: options.enabled.unwrap_or(false),
                interval: options.interval.unwrap_or(Duration::ZERO),
                timeout: options.timeout.unwrap_or(Duration::ZERO),
                port: options.port.unwrap_or(0),
                path: options.path.clone().unwrap_or_default(),
            },
            None => HealthCheckConfig::default(),
        };

        Self {
            health_check,
            load_balancing: desired.load_balancing,
        }
    }
}

/// A backend and the endpoints it dispatches to.
#[derive(Debug)]
pub struct RuntimeBackend {
    id: String,
    config: ConfigSlot<BackendConfig>,
    endpoints: EndpointManager,
}

impl RuntimeBackend {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: ConfigSlot::empty(),
            endpoints: EndpointManager::new(),
        }
    }

    pub fn config(&self) -> Option<Arc<BackendConfig>> {
        self.config.load()
    }

    pub fn endpoints(&self) -> &EndpointManager {
        &self.endpoints
    }

    pub(crate) fn replace_config(&self, config: Arc<BackendConfig>) {
        self.config.store(config);
    }
}

impl ManagedEntity for RuntimeBackend {
    fn create(id: &str) -> Self {
        Self::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }
}
