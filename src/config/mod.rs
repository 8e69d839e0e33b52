//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → handed to ServerLocator / ReqwestTransport
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::DiscoveryConfig;
pub use schema::HealthCheckConfig;
pub use schema::ObservabilityConfig;
pub use schema::TransportConfig;
