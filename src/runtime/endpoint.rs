//! Runtime endpoint.

use std::sync::Arc;

use serde::Serialize;

use crate::runtime::collection::ManagedEntity;
use crate::runtime::slot::ConfigSlot;

/// Immutable endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointConfig {
    pub address: String,
}

impl EndpointConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// A destination of a backend, unique by id within that backend.
#[derive(Debug)]
pub struct RuntimeEndpoint {
    id: String,
    config: ConfigSlot<EndpointConfig>,
}

impl RuntimeEndpoint {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: ConfigSlot::empty(),
        }
    }

    pub fn config(&self) -> Option<Arc<EndpointConfig>> {
        self.config.load()
    }

    pub(crate) fn replace_config(&self, config: Arc<EndpointConfig>) {
        self.config.store(config);
    }
}

impl ManagedEntity for RuntimeEndpoint {
    fn create(id: &str) -> Self {
        Self::new(id)
    }

    fn id(&self) -> &str {
        &self.id
    }
}
