//! Self-contained, time-limited access tokens.
//!
//! A token is the encrypted form of a small JSON payload binding a
//! resource path to an expiry instant. No token is ever stored server
//! side; the bearer of the string holds the capability, and validation
//! is idempotent until the embedded expiry passes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::crypto::service::{CryptoError, EncryptionService};

/// The plaintext a signed access token encrypts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    /// Storage path the token grants access to (`bucket/object/path`).
    pub resource_path: String,

    /// Unix seconds after which the token is dead.
    pub expires_at: i64,
}

/// Current unix time in seconds.
fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

impl EncryptionService {
    /// Mint a signed access token for a resource path.
    pub fn issue_access_token(
        &self,
        resource_path: &str,
        ttl_minutes: i64,
    ) -> Result<String, CryptoError> {
        let payload = AccessTokenPayload {
            resource_path: resource_path.to_string(),
            expires_at: now_unix() + ttl_minutes * 60,
        };

        let bytes = serde_json::to_vec(&payload).map_err(|_| CryptoError::Encryption)?;
        self.encrypt(&bytes)
    }

    /// Validate a token and return the resource path it grants.
    ///
    /// Decrypt failure, a malformed payload and expiry all yield `None`;
    /// validation never errors and never mutates state, so a token may
    /// be checked any number of times until it expires.
    pub fn validate_access_token(&self, token: &str) -> Option<String> {
        let plaintext = self.decrypt(token).ok()?;
        let payload: AccessTokenPayload = serde_json::from_slice(&plaintext).ok()?;

        if payload.expires_at > now_unix() {
            Some(payload.resource_path)
        } else {
            None
        }
    }
}
