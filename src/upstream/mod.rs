//! Upstream backend clients.
//!
//! # Data Flow
//! ```text
//! Gatekeeper / handlers:
//!     → identity.rs  (resolve bearer tokens to user identities)
//!     → log_store.rs (append audit entries, retried once)
//!     → storage.rs   (fetch protected objects as byte streams)
//!
//! All three share one reqwest client (connection pool, timeouts)
//! and authenticate with the backend service credential.
//! ```
//!
//! # Design Decisions
//! - One typed client per backend surface, not one god client
//! - Auth outcomes are data (`Ok(None)`), only transport and
//!   unexpected statuses are errors
//! - The service credential never appears in logs or error text

pub mod identity;
pub mod log_store;
pub mod storage;

pub use identity::{IdentityClient, VerifiedUser};
pub use log_store::LogStoreClient;
pub use storage::{StorageClient, StoredObject};

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never completed (connect, timeout, body read).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a status the caller cannot act on.
    #[error("upstream returned status {0}")]
    Status(StatusCode),

    /// Storage has no object at the requested path.
    #[error("object not found: {0}")]
    ObjectMissing(String),
}

impl UpstreamError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Transport(_) => true,
            UpstreamError::Status(status) => status.is_server_error(),
            UpstreamError::ObjectMissing(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        assert!(UpstreamError::Status(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(UpstreamError::Status(StatusCode::INTERNAL_SERVER_ERROR).is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!UpstreamError::Status(StatusCode::UNPROCESSABLE_ENTITY).is_retryable());
        assert!(!UpstreamError::ObjectMissing("resumes/x.pdf".into()).is_retryable());
    }
}
