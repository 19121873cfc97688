//! proxy-reconciler
//!
//! Watches a TOML configuration file and keeps the proxy's runtime model of
//! backends, endpoints and routes converged to it.
//!
//! # Architecture Overview
//!
//! ```text
//!   proxy.toml ──▶ FileConfigProvider ──change──▶ ReconcileLoop ◀── SIGHUP
//!                   (watcher.rs)                       │
//!                                                      ▼
//!                                               ConfigManager
//!                                    build → backends → endpoints → routes
//!                                                      │
//!                         ┌────────────────────────────┼───────────────┐
//!                         ▼                            ▼               ▼
//!                  BackendManager               RouteManager     RoutingTable
//!                         │                            │               │
//!                         └──────── admin API ◀────────┘       request path
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use proxy_reconciler::admin::{self, AdminState};
use proxy_reconciler::config::schema::DEFAULT_ADMIN_API_KEY;
use proxy_reconciler::config::validation::validate_config;
use proxy_reconciler::config::{ConfigProvider, FileConfigProvider, LogErrorReporter, ProviderConfigBuilder};
use proxy_reconciler::lifecycle::{forward_reload_signals, shutdown_signal, Shutdown};
use proxy_reconciler::observability::{logging, metrics};
use proxy_reconciler::reconcile::{ConfigManager, ReconcileLoop};
use proxy_reconciler::routing::RoutingTable;
use proxy_reconciler::runtime::{BackendManager, DispatchEndpoint, RouteManager};

#[derive(Parser, Debug)]
#[command(name = "proxy-reconciler", version, about = "Dynamic configuration reconciler for the proxy")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "proxy.toml")]
    config: PathBuf,

    /// Validate the configuration, print every error, and exit
    #[arg(long)]
    check: bool,

    /// Reconcile once and exit
    #[arg(long)]
    once: bool,

    /// Print the published routing table as JSON after reconciling once
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Every setting below comes from the provider's copy of the file.
    let provider = Arc::new(FileConfigProvider::open(&cli.config)?);
    let config = provider.current();
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        path = %cli.config.display(),
        "proxy-reconciler starting"
    );

    if cli.check {
        return match validate_config(&config) {
            Ok(()) => {
                println!("{}: OK", cli.config.display());
                Ok(())
            }
            Err(errors) => {
                for error in &errors {
                    println!("{}: {}", cli.config.display(), error);
                }
                Err(format!("{} validation error(s)", errors.len()).into())
            }
        };
    }

    let backends = Arc::new(BackendManager::new());
    let routes = Arc::new(RouteManager::new());
    let table = Arc::new(RoutingTable::new());
    let shutdown = Shutdown::new();

    let manager = Arc::new(
        ConfigManager::new(
            ProviderConfigBuilder::new(Arc::clone(&provider)),
            Arc::clone(&backends),
            Arc::clone(&routes),
            table.clone(),
        )
        .with_cancellation(shutdown.cancellation()),
    );

    if cli.once || cli.dump {
        let applied = manager.apply_configurations(&LogErrorReporter).await;
        if cli.dump {
            let snapshot = table.snapshot();
            let view: Vec<&DispatchEndpoint> = snapshot.iter().map(|d| d.as_ref()).collect();
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        return if applied {
            Ok(())
        } else {
            Err("configuration was not applied".into())
        };
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Dropping the watcher stops reloads, so it lives until shutdown.
    let _watcher = match provider.watch() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::error!(error = %e, "Failed to watch config file, hot reload disabled");
            None
        }
    };

    let admin_task = if config.admin.enabled {
        if config.admin.api_key == DEFAULT_ADMIN_API_KEY {
            tracing::warn!("Admin API is using the default api_key");
        }
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState {
            backends: Arc::clone(&backends),
            routes: Arc::clone(&routes),
            table: Arc::clone(&table),
            api_key: Arc::from(config.admin.api_key.as_str()),
        };
        let mut stop = shutdown.subscribe();
        Some(tokio::spawn(async move {
            let stopped = async move {
                let _ = stop.recv().await;
            };
            if let Err(e) = admin::serve(listener, state, stopped).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }))
    } else {
        None
    };

    let reconcile_loop = ReconcileLoop::new(manager, provider.subscribe());
    tokio::spawn(forward_reload_signals(reconcile_loop.reload_handle()));
    let loop_task = tokio::spawn(reconcile_loop.run(shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();

    if let Err(e) = loop_task.await {
        tracing::error!(error = %e, "Reconcile loop panicked");
    }
    if let Some(task) = admin_task {
        let _ = task.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
