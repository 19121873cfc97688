//! Read-only admin API over the runtime model.
//!
//! # Design Decisions
//! - Handlers only take `items()` snapshots and load config slots; they
//!   never mutate runtime state
//! - Every route sits behind the Bearer-token middleware

pub mod auth;
pub mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::routing::RoutingTable;
use crate::runtime::{BackendManager, RouteManager};

#[derive(Clone)]
pub struct AdminState {
    pub backends: Arc<BackendManager>,
    pub routes: Arc<RouteManager>,
    pub table: Arc<RoutingTable>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .route("/admin/routes", get(get_routes))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Admin API listening");
    }
    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
