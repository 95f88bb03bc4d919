//! Best-effort audit logging.
//!
//! # Data Flow
//! ```text
//! Gatekeeper terminal branch (429 / 401 / handler outcome):
//!     → AuditLogEntry (struct literal at the decision site)
//!     → AuditLogger::record
//!         → upstream::LogStoreClient::append (retried once)
//!         → on failure: warn + metric, entry dropped
//! ```
//!
//! # Design Decisions
//! - Logging failure never blocks or alters the response being returned
//! - Entries are append-only; nothing here reads the log back
//! - Delivery failures surface to operators (stderr, metrics), not clients

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::observability::metrics;
use crate::upstream::LogStoreClient;

/// One security-relevant request outcome, append-only once written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub action: String,

    /// Authenticated subject, absent for anonymous rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,

    pub metadata: serde_json::Value,
    pub origin_address: String,
    pub user_agent: String,

    /// Unix seconds at the moment the outcome was decided.
    pub timestamp: i64,
}

/// Current unix time in seconds, for stamping entries.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Writes audit entries to the durable log store, swallowing failures.
#[derive(Clone)]
pub struct AuditLogger {
    log_store: LogStoreClient,
}

impl AuditLogger {
    pub fn new(log_store: LogStoreClient) -> Self {
        Self { log_store }
    }

    /// Persist one entry. Delivery failure is logged and counted but
    /// never propagated; the response this entry describes is already
    /// on its way out.
    pub async fn record(&self, entry: AuditLogEntry) {
        if let Err(err) = self.log_store.append(&entry).await {
            metrics::record_audit_failure();
            tracing::warn!(
                error = %err,
                action = %entry.action,
                "Audit entry dropped"
            );
        }
    }
}
