//! Background reconciliation task.
//!
//! Owns the only call site of [`ConfigManager::apply_configurations`] in a
//! running process, so reconciliations never overlap.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use crate::config::builder::{ErrorReporter, LogErrorReporter};
use crate::reconcile::manager::ConfigManager;

/// Requests an extra reconciliation, e.g. on SIGHUP.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ReloadHandle {
    /// Ask the loop to reconcile again. Returns false once the loop is gone.
    pub fn trigger(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Runs one reconciliation at startup, then one per config change or
/// reload request, until shutdown.
pub struct ReconcileLoop {
    manager: Arc<ConfigManager>,
    changes: watch::Receiver<u64>,
    reload_tx: mpsc::UnboundedSender<()>,
    reload_rx: mpsc::UnboundedReceiver<()>,
    reporter: Arc<dyn ErrorReporter>,
}

impl ReconcileLoop {
    pub fn new(manager: Arc<ConfigManager>, changes: watch::Receiver<u64>) -> Self {
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();
        Self {
            manager,
            changes,
            reload_tx,
            reload_rx,
            reporter: Arc::new(LogErrorReporter),
        }
    }

    /// Route validation errors somewhere other than the log.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        ReloadHandle {
            tx: self.reload_tx.clone(),
        }
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        self.changes.borrow_and_update();
        self.apply("startup").await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!("Reconcile loop stopping");
                    break;
                }
                changed = self.changes.changed() => {
                    if changed.is_err() {
                        tracing::warn!("Config provider closed, reconcile loop stopping");
                        break;
                    }
                    let version = *self.changes.borrow_and_update();
                    tracing::debug!(version, "Config change received");
                    self.apply("config_change").await;
                }
                Some(()) = self.reload_rx.recv() => {
                    self.apply("reload").await;
                }
            }
        }
    }

    async fn apply(&mut self, trigger: &'static str) {
        // Requests that arrived while waiting are served by this pass.
        while self.reload_rx.try_recv().is_ok() {}

        let applied = self.manager.apply_configurations(self.reporter.as_ref()).await;
        tracing::debug!(trigger, applied, "Reconciliation pass finished");
    }
}

impl std::fmt::Debug for ReconcileLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileLoop")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
