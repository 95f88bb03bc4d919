//! Bearer credential validation.

use axum::http::{header, HeaderMap};

use crate::observability::metrics;
use crate::upstream::IdentityClient;

/// Outcome of bearer validation. Failures are data, not errors, so the
/// gate's control flow stays linear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValidation {
    pub is_valid: bool,
    pub subject_id: Option<String>,
    pub error: Option<String>,
}

impl TokenValidation {
    fn valid(subject_id: String) -> Self {
        Self {
            is_valid: true,
            subject_id: Some(subject_id),
            error: None,
        }
    }

    fn invalid(error: &str) -> Self {
        Self {
            is_valid: false,
            subject_id: None,
            error: Some(error.to_string()),
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// Anything that is not exactly that shape (missing header, other
/// scheme, empty token) yields `None`.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Validates bearer credentials against the identity provider.
#[derive(Clone)]
pub struct TokenValidator {
    identity: IdentityClient,
}

impl TokenValidator {
    pub fn new(identity: IdentityClient) -> Self {
        Self { identity }
    }

    /// Validate the bearer credential carried by `headers`.
    ///
    /// Never fails: a malformed header, a rejected token and an
    /// unreachable identity provider all come back as
    /// `is_valid == false` with a client-safe message. The message
    /// never reveals whether an account exists.
    pub async fn validate(&self, headers: &HeaderMap) -> TokenValidation {
        let Some(token) = extract_bearer(headers) else {
            metrics::record_auth_failure("malformed_header");
            return TokenValidation::invalid("Missing or invalid authorization header");
        };

        match self.identity.verify_bearer(token).await {
            Ok(Some(user)) => TokenValidation::valid(user.id),
            Ok(None) => {
                metrics::record_auth_failure("rejected_token");
                TokenValidation::invalid("Invalid or expired token")
            }
            Err(err) => {
                tracing::warn!(error = %err, "Identity provider unavailable, rejecting request");
                metrics::record_auth_failure("provider_unavailable");
                TokenValidation::invalid("Invalid or expired token")
            }
        }
    }
}
