//! Configuration providers.
//!
//! A provider owns the latest raw [`ProxyConfig`] and signals every change
//! through a `watch` channel carrying a monotonically increasing version.
//! The reconciliation task listens on that channel; the config builder reads
//! [`ConfigProvider::current`] when it runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use notify::RecommendedWatcher;
use tokio::sync::watch;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::ProxyConfig;
use crate::config::watcher::ConfigWatcher;

/// Source of raw configuration plus a change signal.
pub trait ConfigProvider: Send + Sync + 'static {
    /// The most recently loaded configuration.
    fn current(&self) -> Arc<ProxyConfig>;

    /// Subscribe to change notifications. The value is a version counter.
    fn subscribe(&self) -> watch::Receiver<u64>;
}

/// State shared between a provider and whatever feeds it.
#[derive(Debug)]
pub struct ProviderState {
    config: ArcSwap<ProxyConfig>,
    changes: watch::Sender<u64>,
}

impl ProviderState {
    pub fn new(config: ProxyConfig) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            config: ArcSwap::from_pointee(config),
            changes,
        }
    }

    /// Swap in a new configuration and wake subscribers.
    pub fn replace(&self, config: ProxyConfig) {
        self.config.store(Arc::new(config));
        self.changes.send_modify(|version| *version += 1);
    }

    pub fn current(&self) -> Arc<ProxyConfig> {
        self.config.load_full()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.changes.borrow()
    }
}

/// Provider fed programmatically, for embedding and tests.
#[derive(Debug)]
pub struct InMemoryConfigProvider {
    state: ProviderState,
}

impl InMemoryConfigProvider {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            state: ProviderState::new(config),
        }
    }

    /// Replace the configuration and signal a change.
    pub fn update(&self, config: ProxyConfig) {
        self.state.replace(config);
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }
}

impl ConfigProvider for InMemoryConfigProvider {
    fn current(&self) -> Arc<ProxyConfig> {
        self.state.current()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }
}

/// Provider backed by a TOML file on disk.
#[derive(Debug)]
pub struct FileConfigProvider {
    path: PathBuf,
    state: Arc<ProviderState>,
}

impl FileConfigProvider {
    /// Load the file once. Fails if the initial load fails.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let config = load_config(path)?;
        tracing::info!(path = ?path, backends = config.backends.len(), routes = config.routes.len(), "Configuration file loaded");
        Ok(Self {
            path: path.to_path_buf(),
            state: Arc::new(ProviderState::new(config)),
        })
    }

    /// Start watching the file for changes.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn watch(&self) -> Result<RecommendedWatcher, notify::Error> {
        ConfigWatcher::new(&self.path, Arc::clone(&self.state)).run()
    }

    /// Re-read the file now. On failure the current configuration is kept.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = load_config(&self.path)?;
        self.state.replace(config);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn current(&self) -> Arc<ProxyConfig> {
        self.state.current()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }
}
