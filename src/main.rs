//! Security Gateway (v1)
//!
//! A request gatekeeper for the job board platform, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────────────┐
//!                        │                 SECURITY GATEWAY                    │
//!                        │                                                     │
//!   Client Request       │  ┌─────────┐    ┌────────────┐    ┌────────────┐   │
//!   ─────────────────────┼─▶│  http   │───▶│ gatekeeper │───▶│  handlers  │   │
//!                        │  │ server  │    │ rate/auth  │    │crypto/files│   │
//!                        │  └─────────┘    └─────┬──────┘    └─────┬──────┘   │
//!                        │                       │                 │          │
//!                        │                       ▼                 ▼          │
//!   Client Response      │                 ┌──────────┐     ┌────────────┐    │
//!   ◀────────────────────┼─────────────────│  audit   │     │  upstream  │────┼──── Backend
//!                        │                 │  logger  │     │  clients   │    │   (identity,
//!                        │                 └──────────┘     └────────────┘    │    log store,
//!                        │                                                    │    storage)
//!                        │  ┌──────────────────────────────────────────────┐  │
//!                        │  │            Cross-Cutting Concerns             │ │
//!                        │  │  ┌────────┐ ┌──────────┐ ┌──────────────┐    │ │
//!                        │  │  │ config │ │credential│ │observability │    │ │
//!                        │  │  └────────┘ └──────────┘ └──────────────┘    │ │
//!                        │  │  ┌─────────────────┐  ┌──────────────────┐   │ │
//!                        │  │  │   resilience    │  │    lifecycle     │   │ │
//!                        │  │  │ backoff/retry   │  │ signals/shutdown │   │ │
//!                        │  │  └─────────────────┘  └──────────────────┘   │ │
//!                        │  └──────────────────────────────────────────────┘  │
//!                        └────────────────────────────────────────────────────┘
//! ```
//!
//! # Request Pipeline
//!
//! Every inbound request passes through, in order:
//! - Fixed-window rate limiting keyed by client origin
//! - Public-route classification and bearer token verification
//! - The protected handler (encryption, signed URLs, file delivery)
//! - A single audit record per request, success or failure

use std::time::Duration;

use tokio::net::TcpListener;

use security_gateway::config::GatewayConfig;
use security_gateway::http::GatewayServer;
use security_gateway::lifecycle::{signals, Shutdown};
use security_gateway::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration before logging so the configured level applies
    // from the first line of output.
    let config = GatewayConfig::from_env()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("security-gateway v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = ?config.environment,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Shared HTTP client for all backend calls
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeouts.upstream_secs))
        .build()?;

    let shutdown = Shutdown::new();
    signals::spawn_listener(shutdown.clone());

    // Create and run the gateway server
    let server = GatewayServer::new(config, client);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
