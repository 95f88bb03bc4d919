//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up the middleware stack (gate, timeout, request ID, trace,
//!   body limit, concurrency limit, CORS)
//! - Construct the upstream clients and shared state
//! - Spawn the lockout sweeper and serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::audit::AuditLogger;
use crate::config::GatewayConfig;
use crate::credential::LockoutTracker;
use crate::crypto::EncryptionService;
use crate::gatekeeper::{secure_request, GateState, RateLimiter, RouteTable, TokenValidator};
use crate::http::cors::{build_cors_layer, normalize_preflight};
use crate::http::handlers;
use crate::http::request::RequestIdLayer;
use crate::lifecycle::Shutdown;
use crate::upstream::{IdentityClient, LogStoreClient, StorageClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub encryption: Arc<EncryptionService>,
    pub storage: StorageClient,
    pub log_store: LogStoreClient,
}

/// The security gateway's HTTP server.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    lockouts: Arc<LockoutTracker>,
}

impl GatewayServer {
    /// Wire every subsystem. The reqwest client is shared across all
    /// upstream clients, so connection pools and timeouts are
    /// configured once by the caller.
    pub fn new(config: GatewayConfig, client: reqwest::Client) -> Self {
        let encryption = Arc::new(EncryptionService::from_config(&config.encryption));
        let identity = IdentityClient::new(client.clone(), &config.backend);
        let log_store = LogStoreClient::new(client.clone(), &config.backend);
        let storage = StorageClient::new(client, &config.backend);
        let lockouts = Arc::new(LockoutTracker::new(&config.lockout));

        let gate = Arc::new(GateState {
            rate_limiter: RateLimiter::new(&config.rate_limit),
            validator: TokenValidator::new(identity),
            routes: RouteTable::new(&config.public_routes),
            audit: AuditLogger::new(log_store.clone()),
        });

        let state = AppState {
            config: Arc::new(config.clone()),
            encryption,
            storage,
            log_store,
        };

        let router = Self::build_router(&config, state, gate);
        Self {
            router,
            config,
            lockouts,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, gate: Arc<GateState>) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/audit-log", post(handlers::record_audit_event))
            .route(
                "/secure-encrypt",
                get(handlers::secure_encrypt).post(handlers::secure_encrypt),
            )
            .route(
                "/secure-encrypt/test",
                get(handlers::secure_encrypt).post(handlers::secure_encrypt),
            )
            .route("/secure-file-access", get(handlers::secure_file_access))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, secure_request))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(build_cors_layer(
                &config.environment,
                &config.cors.allowed_origins,
            ))
            .layer(middleware::from_fn(normalize_preflight))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = ?self.config.environment,
            "Security gateway starting"
        );

        let sweep_interval = Duration::from_secs(self.config.lockout.sweep_interval_mins * 60);
        tokio::spawn(
            self.lockouts
                .clone()
                .run_sweeper(sweep_interval, shutdown.subscribe()),
        );

        let mut shutdown_rx = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        tracing::info!("Security gateway stopped");
        Ok(())
    }

    /// Lockout tracker for login flows hosted alongside the gateway.
    pub fn lockouts(&self) -> Arc<LockoutTracker> {
        self.lockouts.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
