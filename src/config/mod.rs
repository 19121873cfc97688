//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → provider.rs (latest ProxyConfig + change signal)
//!     → builder.rs (validation.rs semantic checks, errors → ErrorReporter)
//!     → DynamicConfigRoot (snapshot.rs, validated, immutable)
//!     → reconciler
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → provider swaps it in and bumps its version
//!     → reconciliation task wakes up and rebuilds desired state
//! ```
//!
//! # Design Decisions
//! - Desired state is immutable once built; each cycle builds a fresh one
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A file that fails to parse never replaces the current configuration

pub mod builder;
pub mod loader;
pub mod provider;
pub mod schema;
pub mod snapshot;
pub mod validation;
pub mod watcher;

pub use builder::{
    BuildError, CollectingErrorReporter, ConfigBuilder, ErrorReporter, LogErrorReporter,
    ProviderConfigBuilder,
};
pub use loader::{load_config, ConfigError};
pub use provider::{ConfigProvider, FileConfigProvider, InMemoryConfigProvider};
pub use schema::{LoadBalancingMode, ProxyConfig, RouteMatch};
pub use snapshot::{DesiredBackend, DesiredEndpoint, DesiredRoute, DynamicConfigRoot, HealthCheckOptions};
pub use validation::ValidationError;
