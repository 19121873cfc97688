//! Reconciliation events and their observers.
//!
//! Every add/change/remove of a backend, endpoint or route is reported
//! synchronously to a [`ReconcileObserver`]. Observers are a side channel:
//! they never influence control flow.

use std::sync::Mutex;

use crate::observability::metrics;

/// One of the nine entity changes a reconciliation can make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    BackendAdded { backend_id: String },
    BackendChanged { backend_id: String },
    BackendRemoved { backend_id: String },
    EndpointAdded { backend_id: String, endpoint_id: String },
    EndpointChanged { backend_id: String, endpoint_id: String },
    EndpointRemoved { backend_id: String, endpoint_id: String },
    RouteAdded { route_id: String },
    RouteChanged { route_id: String },
    RouteRemoved { route_id: String },
}

impl ReconcileEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendAdded { .. } => "backend_added",
            Self::BackendChanged { .. } => "backend_changed",
            Self::BackendRemoved { .. } => "backend_removed",
            Self::EndpointAdded { .. } => "endpoint_added",
            Self::EndpointChanged { .. } => "endpoint_changed",
            Self::EndpointRemoved { .. } => "endpoint_removed",
            Self::RouteAdded { .. } => "route_added",
            Self::RouteChanged { .. } => "route_changed",
            Self::RouteRemoved { .. } => "route_removed",
        }
    }
}

/// Receives reconciliation events.
pub trait ReconcileObserver: Send + Sync {
    fn on_event(&self, event: &ReconcileEvent);
}

/// Logs every event and counts it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn on_event(&self, event: &ReconcileEvent) {
        metrics::record_event(event.kind());

        match event {
            ReconcileEvent::BackendAdded { backend_id } => {
                tracing::info!(backend_id = %backend_id, "Backend added")
            }
            ReconcileEvent::BackendChanged { backend_id } => {
                tracing::info!(backend_id = %backend_id, "Backend changed")
            }
            ReconcileEvent::BackendRemoved { backend_id } => {
                tracing::info!(backend_id = %backend_id, "Backend removed")
            }
            ReconcileEvent::EndpointAdded { backend_id, endpoint_id } => {
                tracing::info!(backend_id = %backend_id, endpoint_id = %endpoint_id, "Endpoint added")
            }
            ReconcileEvent::EndpointChanged { backend_id, endpoint_id } => {
                tracing::info!(backend_id = %backend_id, endpoint_id = %endpoint_id, "Endpoint changed")
            }
            ReconcileEvent::EndpointRemoved { backend_id, endpoint_id } => {
                tracing::info!(backend_id = %backend_id, endpoint_id = %endpoint_id, "Endpoint removed")
            }
            ReconcileEvent::RouteAdded { route_id } => {
                tracing::info!(route_id = %route_id, "Route added")
            }
            ReconcileEvent::RouteChanged { route_id } => {
                tracing::info!(route_id = %route_id, "Route changed")
            }
            ReconcileEvent::RouteRemoved { route_id } => {
                tracing::info!(route_id = %route_id, "Route removed")
            }
        }
    }
}

/// Records events in memory, for audit and tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ReconcileEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<ReconcileEvent> {
        self.events.lock().expect("observer mutex poisoned").clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<ReconcileEvent> {
        std::mem::take(&mut *self.events.lock().expect("observer mutex poisoned"))
    }
}

impl ReconcileObserver for RecordingObserver {
    fn on_event(&self, event: &ReconcileEvent) {
        self.events
            .lock()
            .expect("observer mutex poisoned")
            .push(event.clone());
    }
}
