//! Audit log persistence via the backend REST API.

use reqwest::Client;

use crate::audit::AuditLogEntry;
use crate::config::BackendConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::upstream::UpstreamError;

/// Transient failures get one more attempt before the entry is dropped.
const MAX_APPEND_RETRIES: u32 = 1;

const RETRY_BASE_MS: u64 = 50;
const RETRY_MAX_MS: u64 = 500;

/// Client for the backend audit log table.
#[derive(Clone)]
pub struct LogStoreClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl LogStoreClient {
    pub fn new(client: Client, backend: &BackendConfig) -> Self {
        Self {
            client,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            service_key: backend.service_key.clone(),
        }
    }

    /// Append one audit entry, retrying transient failures once.
    pub async fn append(&self, entry: &AuditLogEntry) -> Result<(), UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.send(entry).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < MAX_APPEND_RETRIES && err.is_retryable() => {
                    attempt += 1;
                    let delay = calculate_backoff(attempt, RETRY_BASE_MS, RETRY_MAX_MS);
                    tracing::debug!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying audit log append"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send(&self, entry: &AuditLogEntry) -> Result<(), UpstreamError> {
        let response = self
            .client
            .post(format!("{}/rest/v1/security_audit_log", self.base_url))
            .header("apikey", &self.service_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.service_key)
            .json(entry)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status(status))
        }
    }
}
