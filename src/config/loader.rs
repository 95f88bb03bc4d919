//! Configuration loading from disk and environment.
//!
//! The bulk of the configuration comes from an optional TOML file; the
//! secrets the platform provisions (backend URL, service credential,
//! encryption key) are taken from environment variables so they never
//! land in a config file. Components receive the resulting struct at
//! construction time and never read the environment themselves.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file path.
pub const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG";
/// Environment variable for the managed backend base URL.
pub const ENV_BACKEND_URL: &str = "GATEWAY_BACKEND_URL";
/// Environment variable for the backend service credential.
pub const ENV_SERVICE_KEY: &str = "GATEWAY_SERVICE_KEY";
/// Environment variable for the hex-encoded 256-bit encryption key.
pub const ENV_ENCRYPTION_KEY: &str = "GATEWAY_ENCRYPTION_KEY";
/// Environment variable selecting the deployment environment.
pub const ENV_ENVIRONMENT: &str = "GATEWAY_ENVIRONMENT";
/// Environment variable overriding the listener bind address.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl GatewayConfig {
    /// Build the configuration the way a deployment provides it: an
    /// optional TOML file named by `GATEWAY_CONFIG`, then environment
    /// overrides for the secrets and deployment knobs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var(ENV_CONFIG_PATH) {
            Ok(path) => {
                let content = fs::read_to_string(&path).map_err(ConfigError::Io)?;
                toml::from_str(&content).map_err(ConfigError::Parse)?
            }
            Err(_) => GatewayConfig::default(),
        };

        apply_overrides(&mut config, |key| env::var(key).ok());

        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }
}

/// Apply environment overrides from an arbitrary lookup.
///
/// Separated from `from_env` so tests can drive it without touching
/// process-global state.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BACKEND_URL) {
        config.backend.base_url = url;
    }
    if let Some(key) = lookup(ENV_SERVICE_KEY) {
        config.backend.service_key = key;
    }
    if let Some(key) = lookup(ENV_ENCRYPTION_KEY) {
        config.encryption.key_hex = key;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(value) = lookup(ENV_ENVIRONMENT) {
        match value.to_lowercase().as_str() {
            "production" => config.environment = Environment::Production,
            "development" => config.environment = Environment::Development,
            other => {
                tracing::warn!(
                    value = %other,
                    "Unknown deployment environment, keeping {:?}",
                    config.environment
                );
            }
        }
    }
}
