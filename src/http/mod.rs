//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, graceful shutdown)
//!     → cors.rs (environment-gated origin policy, preflight shape)
//!     → request.rs (request ID, client origin extraction)
//!     → gatekeeper (rate limit, auth, audit; see crate::gatekeeper)
//!     → handlers.rs (audit-log, secure-encrypt, secure-file-access)
//!     → error.rs (uniform {error, message} envelope)
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{client_origin, user_agent, RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
