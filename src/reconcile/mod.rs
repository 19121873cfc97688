//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Trigger (startup, config change, SIGHUP) → task.rs
//!     → manager.rs: ConfigBuilder::build_config (may reject or cancel)
//!     → backends.rs: per backend
//!         → endpoints.rs (add / change / remove endpoints)
//!         → compare and swap the backend config
//!       then remove undesired backends (their endpoints first)
//!     → routes.rs: per route
//!         → resolve backend, has_config_changed?
//!         → RouteConfigBuilder::build, swap the route config
//!       then remove undesired routes
//!       → publish the routing table if anything changed
//! Every add / change / remove → events.rs observer
//! ```
//!
//! # Design Decisions
//! - Backends always settle before routes, so routes bind current backends
//! - Unchanged entities keep their exact config instance
//! - Rejected or cancelled builds leave runtime state untouched
//! - Only one reconciliation runs at a time

pub mod backends;
pub mod endpoints;
pub mod events;
pub mod manager;
pub mod routes;
pub mod task;

pub use backends::update_runtime_backends;
pub use endpoints::update_runtime_endpoints;
pub use events::{ReconcileEvent, ReconcileObserver, RecordingObserver, TracingObserver};
pub use manager::ConfigManager;
pub use routes::update_runtime_routes;
pub use task::{ReconcileLoop, ReloadHandle};
