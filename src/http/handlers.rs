//! Route handlers.
//!
//! Handlers return `Result<_, ApiError>` so every failure leaves the
//! process as the `{error, message}` envelope. The gate middleware has
//! already rate-limited and authenticated by the time these run; the
//! `AuthContext` extension carries whatever subject it resolved.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::{unix_timestamp, AuditLogEntry};
use crate::gatekeeper::AuthContext;
use crate::http::error::ApiError;
use crate::http::request::{client_origin, user_agent};
use crate::http::server::AppState;
use crate::upstream::UpstreamError;

/// Signed URLs default to a 15 minute lifetime.
const DEFAULT_URL_TTL_MINUTES: i64 = 15;

/// Liveness probe. Public by default.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Envelope 404 for paths no route claims.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventRequest {
    pub action: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// `POST /audit-log`: persist a caller-described security event.
///
/// Unlike the gate's own audit writes, persistence failure here is the
/// whole point of the call, so it surfaces as a 500 instead of being
/// swallowed.
pub async fn record_audit_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    payload: Result<Json<AuditEventRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if body.action.trim().is_empty() {
        return Err(ApiError::Validation(
            "Field \"action\" must not be empty".to_string(),
        ));
    }

    let entry = AuditLogEntry {
        action: body.action,
        actor_id: auth.subject_id,
        metadata: body.metadata.unwrap_or_else(|| json!({})),
        origin_address: client_origin(&headers),
        user_agent: user_agent(&headers),
        timestamp: unix_timestamp(),
    };

    state.log_store.append(&entry).await.map_err(|err| {
        tracing::error!(error = %err, action = %entry.action, "Failed to persist audit event");
        ApiError::internal(err, &state.config.environment)
    })?;

    Ok(Json(json!({"success": true})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureEncryptRequest {
    pub action: Option<String>,
    pub data: Option<String>,
    pub file_path: Option<String>,
    pub expiry_minutes: Option<i64>,
}

fn require<T>(field: Option<T>, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| ApiError::Validation(format!("Missing required field: {name}")))
}

/// `GET|POST /secure-encrypt`: encryption service operations, selected
/// by the `action` field. Also mounted at `/secure-encrypt/test`,
/// which the default route table leaves public.
pub async fn secure_encrypt(
    State(state): State<AppState>,
    payload: Result<Json<SecureEncryptRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let action = require(body.action, "action")?;

    match action.as_str() {
        "encrypt" => {
            let data = require(body.data, "data")?;
            let encrypted = state.encryption.encrypt(data.as_bytes())?;
            Ok(Json(json!({"encryptedData": encrypted})))
        }
        "decrypt" => {
            let data = require(body.data, "data")?;
            let plaintext = state.encryption.decrypt(&data)?;
            let decrypted = String::from_utf8(plaintext)
                .map_err(|_| crate::crypto::CryptoError::Decryption)?;
            Ok(Json(json!({"decryptedData": decrypted})))
        }
        "signUrl" => {
            let file_path = require(body.file_path, "filePath")?;
            let ttl = body.expiry_minutes.unwrap_or(DEFAULT_URL_TTL_MINUTES);
            let token = state.encryption.issue_access_token(&file_path, ttl)?;
            Ok(Json(json!({"signedUrl": format!("/secure-file-access?token={token}")})))
        }
        "validateUrl" => {
            let data = require(body.data, "data")?;
            match state.encryption.validate_access_token(&data) {
                Some(file_path) => Ok(Json(json!({"isValid": true, "filePath": file_path}))),
                None => Ok(Json(json!({"isValid": false}))),
            }
        }
        other => Err(ApiError::Validation(format!("Unsupported action: {other}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct FileAccessQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /secure-file-access?token=...`: redeem a signed URL for the
/// file it grants, streamed with no-share cache directives.
pub async fn secure_file_access(
    State(state): State<AppState>,
    Query(query): Query<FileAccessQuery>,
) -> Result<Response, ApiError> {
    let token = query.token.unwrap_or_default();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::Validation("Invalid token format".to_string()));
    }

    let Some(resource_path) = state.encryption.validate_access_token(&token) else {
        return Err(ApiError::Forbidden("Invalid or expired token".to_string()));
    };

    let object = state
        .storage
        .fetch_object(&resource_path)
        .await
        .map_err(|err| match err {
            UpstreamError::ObjectMissing(_) => ApiError::NotFound("File not found".to_string()),
            other => {
                tracing::error!(error = %other, "Storage fetch failed");
                ApiError::internal(other, &state.config.environment)
            }
        })?;

    let filename = resource_path.rsplit('/').next().unwrap_or("download");
    let content_type = object
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CACHE_CONTROL, "private, max-age=300");
    if let Some(length) = object.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(object.into_byte_stream()))
        .map_err(|err| ApiError::internal(err, &state.config.environment))
}
