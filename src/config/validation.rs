//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate ids, endpoint addresses and health-check settings
//! - Validate route match conditions
//! - Detect duplicate route ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before a desired-state snapshot is built
//! - A route naming an unknown backend is NOT an error

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{BackendDefinition, ProxyConfig, RouteDefinition};

const KNOWN_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "TRACE", "CONNECT",
];

/// A single semantic problem in a configuration, naming the offending entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("backend id must not be empty")]
    EmptyBackendId,

    #[error("backend '{backend_id}' has an endpoint with an empty id")]
    EmptyEndpointId { backend_id: String },

    #[error("endpoint '{endpoint_id}' of backend '{backend_id}' has invalid address '{address}': {reason}")]
    InvalidEndpointAddress {
        backend_id: String,
        endpoint_id: String,
        address: String,
        reason: String,
    },

    #[error("backend '{backend_id}' has an invalid health check: {reason}")]
    InvalidHealthCheck { backend_id: String, reason: String },

    #[error("route #{index} has an empty id")]
    EmptyRouteId { index: usize },

    #[error("route id '{route_id}' is declared more than once")]
    DuplicateRouteId { route_id: String },

    #[error("route '{route_id}' has no match condition")]
    MissingMatch { route_id: String },

    #[error("route '{route_id}' has an empty host")]
    EmptyHost { route_id: String },

    #[error("route '{route_id}' path prefix '{path}' must start with '/'")]
    InvalidPathPrefix { route_id: String, path: String },

    #[error("route '{route_id}' has unknown HTTP method '{method}'")]
    InvalidMethod { route_id: String, method: String },

    #[error("route '{route_id}' has a header match with an empty name")]
    EmptyHeaderName { route_id: String },

    #[error("route '{route_id}' transform #{index} is empty")]
    EmptyTransform { route_id: String, index: usize },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (backend_id, backend) in &config.backends {
        validate_backend(backend_id, backend, &mut errors);
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.id.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteId { index });
            continue;
        }
        if !seen.insert(route.id.as_str()) {
            errors.push(ValidationError::DuplicateRouteId {
                route_id: route.id.clone(),
            });
        }
        validate_route(route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_backend(backend_id: &str, backend: &BackendDefinition, errors: &mut Vec<ValidationError>) {
    if backend_id.trim().is_empty() {
        errors.push(ValidationError::EmptyBackendId);
        return;
    }

    for (endpoint_id, endpoint) in &backend.endpoints {
        if endpoint_id.trim().is_empty() {
            errors.push(ValidationError::EmptyEndpointId {
                backend_id: backend_id.to_string(),
            });
            continue;
        }
        if let Err(reason) = check_address(&endpoint.address) {
            errors.push(ValidationError::InvalidEndpointAddress {
                backend_id: backend_id.to_string(),
                endpoint_id: endpoint_id.clone(),
                address: endpoint.address.clone(),
                reason,
            });
        }
    }

    let Some(health_check) = &backend.health_check else {
        return;
    };
    let invalid = |reason: &str| ValidationError::InvalidHealthCheck {
        backend_id: backend_id.to_string(),
        reason: reason.to_string(),
    };
    if let Some(path) = &health_check.path {
        if !path.is_empty() && !path.starts_with('/') {
            errors.push(invalid("path must start with '/'"));
        }
    }
    if health_check.enabled == Some(true) {
        match (health_check.interval_secs, health_check.timeout_secs) {
            (None | Some(0), _) => errors.push(invalid("interval must be positive when enabled")),
            (_, None | Some(0)) => errors.push(invalid("timeout must be positive when enabled")),
            (Some(interval), Some(timeout)) if timeout > interval => {
                errors.push(invalid("timeout must not exceed interval"))
            }
            _ => {}
        }
    }
}

fn validate_route(route: &RouteDefinition, errors: &mut Vec<ValidationError>) {
    let route_id = || route.id.clone();
    let route_match = &route.route_match;

    if route_match.is_empty() {
        errors.push(ValidationError::MissingMatch { route_id: route_id() });
    }
    if route_match.hosts.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::EmptyHost { route_id: route_id() });
    }
    if let Some(path) = &route_match.path_prefix {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidPathPrefix {
                route_id: route_id(),
                path: path.clone(),
            });
        }
    }
    for method in &route_match.methods {
        if !KNOWN_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
            errors.push(ValidationError::InvalidMethod {
                route_id: route_id(),
                method: method.clone(),
            });
        }
    }
    if route_match.headers.iter().any(|h| h.name.trim().is_empty()) {
        errors.push(ValidationError::EmptyHeaderName { route_id: route_id() });
    }
    for (index, transform) in route.transforms.iter().enumerate() {
        if transform.is_empty() {
            errors.push(ValidationError::EmptyTransform {
                route_id: route_id(),
                index,
            });
        }
    }
}

/// Check an endpoint address: either `host:port` or an `http(s)://` URL.
pub fn check_address(address: &str) -> Result<(), String> {
    let address = address.trim();
    if address.is_empty() {
        return Err("address is empty".to_string());
    }

    let url = if address.contains("://") {
        Url::parse(address).map_err(|e| e.to_string())?
    } else {
        // `Url::port` hides default ports, so the written port is checked here.
        let port = address.rsplit_once(':').map(|(_, port)| port);
        match port.map(str::parse::<u16>) {
            Some(Ok(port)) if port != 0 => {}
            Some(_) => return Err("invalid port".to_string()),
            None => return Err("missing port".to_string()),
        }
        Url::parse(&format!("http://{}", address)).map_err(|e| e.to_string())?
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}
