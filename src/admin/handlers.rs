use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::runtime::{BackendConfig, ManagedEntity};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub table_version: u64,
    pub dispatch_endpoints: usize,
    pub backends: usize,
    pub routes: usize,
}

#[derive(Serialize)]
pub struct EndpointStatus {
    pub id: String,
    /// Absent until the first config has been stored.
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct BackendStatus {
    pub id: String,
    pub config: Option<BackendConfig>,
    pub endpoints: Vec<EndpointStatus>,
}

#[derive(Serialize)]
pub struct RouteStatus {
    pub id: String,
    pub order: Option<i32>,
    pub backend_id: Option<String>,
    pub backend_resolved: bool,
    pub dispatch_endpoints: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        table_version: state.table.version(),
        dispatch_endpoints: state.table.snapshot().len(),
        backends: state.backends.len(),
        routes: state.routes.len(),
    })
}

pub async fn get_backends(State(state): State<AdminState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .backends
        .items()
        .iter()
        .map(|backend| BackendStatus {
            id: backend.id().to_string(),
            config: backend.config().map(|c| (*c).clone()),
            endpoints: backend
                .endpoints()
                .items()
                .iter()
                .map(|endpoint| EndpointStatus {
                    id: endpoint.id().to_string(),
                    address: endpoint.config().map(|c| c.address.clone()),
                })
                .collect(),
        })
        .collect();

    Json(statuses)
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<Vec<RouteStatus>> {
    let statuses = state
        .routes
        .items()
        .iter()
        .map(|route| {
            let config = route.config();
            RouteStatus {
                id: route.id().to_string(),
                order: config.as_ref().map(|c| c.route().order),
                backend_id: config.as_ref().and_then(|c| c.route().backend_id.clone()),
                backend_resolved: config.as_ref().is_some_and(|c| c.backend().is_some()),
                dispatch_endpoints: config.as_ref().map_or(0, |c| c.endpoints().len()),
            }
        })
        .collect();

    Json(statuses)
}
