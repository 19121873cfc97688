//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Error type for configuration loading.
///
/// Loading is syntactic only; semantic checks happen when the desired-state
/// snapshot is built, so their errors flow through an
/// [`ErrorReporter`](crate::config::builder::ErrorReporter) instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LoadBalancingMode;

    const SAMPLE: &str = r#"
        [observability]
        log_level = "debug"

        [backends.b1]
        load_balancing = "round_robin"

        [backends.b1.health_check]
        enabled = true
        interval_secs = 10
        path = "/health"

        [backends.b1.endpoints.e1]
        address = "10.0.0.1:80"

        [backends.b1.endpoints.e2]
        address = "10.0.0.2:80"

        [[routes]]
        id = "r1"
        backend = "b1"
        order = 5

        [routes.match]
        hosts = ["example.com"]
        path_prefix = "/api"
        methods = ["GET"]

        [[routes.match.headers]]
        name = "x-tenant"
        values = ["blue"]

        [[routes.transforms]]
        PathRemovePrefix = "/api"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.admin.enabled);

        let backend = &config.backends["b1"];
        assert_eq!(backend.load_balancing, LoadBalancingMode::RoundRobin);
        assert_eq!(backend.endpoints.len(), 2);
        assert_eq!(backend.endpoints["e1"].address, "10.0.0.1:80");

        let health = backend.health_check.as_ref().unwrap();
        assert_eq!(health.enabled, Some(true));
        assert_eq!(health.interval_secs, Some(10));
        assert_eq!(health.timeout_secs, None);

        let route = &config.routes[0];
        assert_eq!(route.id, "r1");
        assert_eq!(route.backend.as_deref(), Some("b1"));
        assert_eq!(route.order, 5);
        assert_eq!(route.route_match.hosts, vec!["example.com"]);
        assert_eq!(route.route_match.headers[0].values, vec!["blue"]);
        assert_eq!(route.transforms[0]["PathRemovePrefix"], "/api");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.backends.is_empty());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[[routes]]\nbackend = \"b1\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
