//! Live runtime model.
//!
//! # Data Flow
//! ```text
//! BackendManager (collection.rs)
//!     → RuntimeBackend (backend.rs): ConfigSlot<BackendConfig>
//!         → EndpointManager
//!             → RuntimeEndpoint (endpoint.rs): ConfigSlot<EndpointConfig>
//!
//! RouteManager
//!     → RuntimeRoute (route.rs): ConfigSlot<RouteConfig>
//!         → resolved RuntimeBackend (shared, may be absent)
//!         → DispatchEndpoint[] (published in the routing table)
//! ```
//!
//! # Design Decisions
//! - Entities are `Arc`-shared; removal from a registry never invalidates a
//!   reference held by the data path
//! - Config slots are written only by the reconciler and read lock-free
//! - Entity lifecycle: Absent → Created (empty slot) → Configured → Removed;
//!   a removed id may come back later as a fresh entity

pub mod backend;
pub mod collection;
pub mod endpoint;
pub mod route;
pub mod slot;

pub use backend::{BackendConfig, HealthCheckConfig, RuntimeBackend};
pub use collection::{ManagedCollection, ManagedEntity};
pub use endpoint::{EndpointConfig, RuntimeEndpoint};
pub use route::{BackendSnapshot, DispatchEndpoint, RouteConfig, RuntimeRoute};
pub use slot::ConfigSlot;

pub type BackendManager = ManagedCollection<RuntimeBackend>;
pub type EndpointManager = ManagedCollection<RuntimeEndpoint>;
pub type RouteManager = ManagedCollection<RuntimeRoute>;
