//! Bearer token resolution against the backend identity API.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::BackendConfig;
use crate::upstream::UpstreamError;

/// Identity the backend resolved for a bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedUser {
    pub id: String,
}

/// Client for the backend identity endpoint.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl IdentityClient {
    pub fn new(client: Client, backend: &BackendConfig) -> Self {
        Self {
            client,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            service_key: backend.service_key.clone(),
        }
    }

    /// Ask the backend who a bearer token belongs to.
    ///
    /// `Ok(None)` means the backend rejected the token; that is a
    /// normal outcome, not an error. `Err` is reserved for transport
    /// failures and statuses the gate cannot interpret.
    pub async fn verify_bearer(&self, token: &str) -> Result<Option<VerifiedUser>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user = response.json::<VerifiedUser>().await?;
                Ok(Some(user))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(UpstreamError::Status(status)),
        }
    }
}
