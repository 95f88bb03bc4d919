//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets (service key, encryption key) come only from the
//!   environment, never from the config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::Environment;
pub use schema::GatewayConfig;
pub use schema::PublicRouteConfig;
pub use schema::{
    BackendConfig, CorsConfig, EncryptionConfig, ListenerConfig, LockoutConfig,
    ObservabilityConfig, RateLimitConfig, TimeoutConfig,
};
