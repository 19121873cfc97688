//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route compilation (per reconciliation, only for changed routes):
//!     DesiredRoute + resolved RuntimeBackend
//!     → builder.rs (compile matchers, one descriptor per endpoint)
//!     → RouteConfig stored on the RuntimeRoute
//!
//! Publication:
//!     all RouteConfig descriptors, in route-manager order
//!     → table.rs (atomic swap of the whole table)
//!
//! Incoming request (data path, read only):
//!     → router.rs (route lookup on one table snapshot)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched route + its endpoints, or NoMatch
//! ```
//!
//! # Design Decisions
//! - Published tables are immutable; each publish replaces the whole table
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by route order)

pub mod builder;
pub mod matcher;
pub mod router;
pub mod table;

pub use builder::{DefaultRouteConfigBuilder, RouteConfigBuilder};
pub use router::RouteSelection;
pub use table::{RouteTablePublisher, RouteTableSnapshot, RoutingTable};
