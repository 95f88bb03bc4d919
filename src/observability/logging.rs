//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber exactly once at startup
//! - Honor `RUST_LOG` when set, fall back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via config and environment

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_level` is used when `RUST_LOG` is absent or unparsable,
/// scoped to this crate plus tower-http request traces.
pub fn init_logging(default_level: &str) {
    let fallback = format!("security_gateway={default_level},tower_http={default_level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
