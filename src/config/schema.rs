//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the security gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Deployment environment. Controls error-detail exposure and the
    /// CORS posture. Defaults to production so nothing leaks unless a
    /// deployment opts into development behavior.
    pub environment: Environment,

    /// Cross-origin policy for browser clients.
    pub cors: CorsConfig,

    /// Managed backend (identity provider, log store, object storage).
    pub backend: BackendConfig,

    /// Symmetric encryption settings for access tokens.
    pub encryption: EncryptionConfig,

    /// Fixed-window rate limiting policy.
    pub rate_limit: RateLimitConfig,

    /// Account lockout policy.
    pub lockout: LockoutConfig,

    /// Routes exempt from bearer authentication.
    #[serde(default = "default_public_routes")]
    pub public_routes: Vec<PublicRouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            environment: Environment::default(),
            cors: CorsConfig::default(),
            backend: BackendConfig::default(),
            encryption: EncryptionConfig::default(),
            rate_limit: RateLimitConfig::default(),
            lockout: LockoutConfig::default(),
            public_routes: default_public_routes(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    /// True when internal error detail may be shown to callers.
    pub fn exposes_detail(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Cross-origin policy.
///
/// In development the gateway answers any origin. In production only the
/// origins listed here are allowed; entries may contain a single `*` to
/// match a subdomain pattern (e.g. `https://*.jobs.example.com`). An empty
/// list in production means same-origin only.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins for production deployments.
    pub allowed_origins: Vec<String>,
}

/// Managed backend connection settings.
///
/// The identity provider, audit log store and object storage all live
/// behind this one base URL and are reached with the service credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the managed backend (e.g. "http://localhost:54321").
    pub base_url: String,

    /// Service credential presented to the backend. Environment-provided
    /// (`GATEWAY_SERVICE_KEY`); never committed to config files.
    pub service_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            service_key: String::new(),
        }
    }
}

/// Symmetric encryption settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EncryptionConfig {
    /// 256-bit key, hex-encoded (64 characters). Environment-provided
    /// (`GATEWAY_ENCRYPTION_KEY`). An absent key is not a startup error:
    /// it surfaces as a configuration error on first cryptographic use.
    pub key_hex: String,
}

/// Fixed-window rate limiting policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per window per client identifier.
    pub max_requests: u32,

    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

/// Account lockout policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockoutConfig {
    /// Failures before an account locks.
    pub max_failures: u32,

    /// Lockout window in minutes.
    pub window_mins: u64,

    /// Interval between background sweeps of stale records, in minutes.
    pub sweep_interval_mins: u64,

    /// Distinct failure origins above which activity is flagged
    /// suspicious.
    pub suspicious_origin_threshold: usize,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_mins: 15,
            sweep_interval_mins: 15,
            suspicious_origin_threshold: 2,
        }
    }
}

/// A route exempt from bearer authentication.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicRouteConfig {
    /// Exact request path (e.g. "/health").
    pub path: String,

    /// HTTP methods the exemption covers.
    pub methods: Vec<String>,
}

/// Default public routes: health checks and the encryption test endpoint.
pub fn default_public_routes() -> Vec<PublicRouteConfig> {
    vec![
        PublicRouteConfig {
            path: "/health".to_string(),
            methods: vec!["GET".to_string()],
        },
        PublicRouteConfig {
            path: "/secure-encrypt/test".to_string(),
            methods: vec!["GET".to_string(), "POST".to_string()],
        },
    ]
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for calls to the managed backend in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
