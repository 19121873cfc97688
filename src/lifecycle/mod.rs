//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → cancel in-flight config build
//!     → broadcast stop → reconcile loop, watcher, admin API exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Force a reconciliation pass
//! ```
//!
//! # Design Decisions
//! - Shutdown never interrupts a reconciliation mid-diff; cancellation is
//!   only observed before runtime state is touched

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{forward_reload_signals, shutdown_signal};
