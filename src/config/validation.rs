//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (windows > 0, key length)
//! - Validate the backend base URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - An absent encryption key is allowed here; it becomes a
//!   configuration error on first cryptographic use, not at startup

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBackendUrl(String),
    InvalidEncryptionKey(String),
    ZeroRateLimitWindow,
    ZeroRateLimitBudget,
    ZeroLockoutWindow,
    ZeroLockoutThreshold,
    EmptyPublicRouteMethods(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBackendUrl(url) => {
                write!(f, "backend.base_url is not a valid URL: {}", url)
            }
            ValidationError::InvalidEncryptionKey(reason) => {
                write!(f, "encryption.key_hex is invalid: {}", reason)
            }
            ValidationError::ZeroRateLimitWindow => {
                write!(f, "rate_limit.window_secs must be greater than zero")
            }
            ValidationError::ZeroRateLimitBudget => {
                write!(f, "rate_limit.max_requests must be greater than zero")
            }
            ValidationError::ZeroLockoutWindow => {
                write!(f, "lockout.window_mins must be greater than zero")
            }
            ValidationError::ZeroLockoutThreshold => {
                write!(f, "lockout.max_failures must be greater than zero")
            }
            ValidationError::EmptyPublicRouteMethods(path) => {
                write!(f, "public route {} lists no methods", path)
            }
        }
    }
}

/// Validate a configuration, collecting every failure.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if Url::parse(&config.backend.base_url).is_err() {
        errors.push(ValidationError::InvalidBackendUrl(
            config.backend.base_url.clone(),
        ));
    }

    // Empty means deferred; anything else must decode to 32 bytes.
    if !config.encryption.key_hex.is_empty() {
        match hex::decode(config.encryption.key_hex.trim()) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => errors.push(ValidationError::InvalidEncryptionKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            ))),
            Err(_) => errors.push(ValidationError::InvalidEncryptionKey(
                "not valid hex".to_string(),
            )),
        }
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroRateLimitWindow);
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroRateLimitBudget);
    }
    if config.lockout.window_mins == 0 {
        errors.push(ValidationError::ZeroLockoutWindow);
    }
    if config.lockout.max_failures == 0 {
        errors.push(ValidationError::ZeroLockoutThreshold);
    }
    for route in &config.public_routes {
        if route.methods.is_empty() {
            errors.push(ValidationError::EmptyPublicRouteMethods(route.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
