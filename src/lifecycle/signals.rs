//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT / SIGTERM and report them as a shutdown request
//! - Turn SIGHUP into a forced reconciliation
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A handler that fails to install is logged, not fatal
//! - SIGHUP triggers config reload, not shutdown

use crate::reconcile::ReloadHandle;

/// Resolve once the process is asked to stop (Ctrl+C, or SIGTERM on unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

/// Forward every SIGHUP to the reconcile loop until it goes away.
#[cfg(unix)]
pub async fn forward_reload_signals(reload: ReloadHandle) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGHUP handler");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        tracing::info!("SIGHUP received, forcing reconciliation");
        if !reload.trigger() {
            break;
        }
    }
}

/// SIGHUP does not exist here; reloads come from config changes only.
#[cfg(not(unix))]
pub async fn forward_reload_signals(reload: ReloadHandle) {
    let _ = reload;
}
