//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciler produces:
//!     → logging.rs (structured log events, one per add/change/remove)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with entity ids as fields
//! - Each reconciliation cycle runs in a span carrying a cycle id
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
