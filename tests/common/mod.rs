//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use proxy_reconciler::config::loader::parse_config;
use proxy_reconciler::config::{InMemoryConfigProvider, ProviderConfigBuilder, ProxyConfig};
use proxy_reconciler::reconcile::{ConfigManager, RecordingObserver};
use proxy_reconciler::routing::RoutingTable;
use proxy_reconciler::runtime::{BackendManager, RouteManager};

/// One backend `b1` with endpoint `e1`, health checks off, and route `r1` → `b1`.
pub const BASE_CONFIG: &str = r#"
[backends.b1.endpoints.e1]
address = "10.0.0.1:80"

[[routes]]
id = "r1"
backend = "b1"

[routes.match]
path_prefix = "/"
"#;

pub fn config(toml: &str) -> ProxyConfig {
    parse_config(toml).unwrap()
}

/// A manager wired to an in-memory provider, with every output observable.
pub struct Harness {
    pub provider: Arc<InMemoryConfigProvider>,
    pub manager: Arc<ConfigManager>,
    pub table: Arc<RoutingTable>,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub fn new(initial: &str) -> Self {
        let provider = Arc::new(InMemoryConfigProvider::new(config(initial)));
        let table = Arc::new(RoutingTable::new());
        let observer = Arc::new(RecordingObserver::new());
        let manager = ConfigManager::new(
            ProviderConfigBuilder::new(Arc::clone(&provider)),
            Arc::new(BackendManager::new()),
            Arc::new(RouteManager::new()),
            table.clone(),
        )
        .with_observer(observer.clone());

        Self {
            provider,
            manager: Arc::new(manager),
            table,
            observer,
        }
    }

    pub fn update(&self, toml: &str) {
        self.provider.update(config(toml));
    }
}

/// Poll `check` until it holds, failing the test after two seconds.
pub async fn wait_until<F, Fut>(check: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

/// A fresh path under the system temp dir.
pub fn temp_config_path() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("proxy-reconciler-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("proxy.toml")
}
