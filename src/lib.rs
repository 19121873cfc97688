//! Dynamic configuration reconciler for a reverse proxy.
//!
//! Keeps a live model of backends, endpoints and routes in step with a
//! declarative configuration, and publishes an immutable routing table that
//! the request path reads without locks.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;
pub mod routing;
pub mod runtime;

pub use config::schema::ProxyConfig;
pub use lifecycle::Shutdown;
pub use reconcile::{ConfigManager, ReconcileLoop};
pub use routing::RoutingTable;
