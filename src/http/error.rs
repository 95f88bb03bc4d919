//! The error envelope every non-2xx response wears.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;
use crate::crypto::CryptoError;
use crate::upstream::UpstreamError;

/// Wire shape of an error response: `{error, message?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Client-facing failure, carrying the HTTP semantic in its variant.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap an internal failure as a 500, with detail only outside
    /// production. The default is the generic message; leaking is
    /// opt-in per environment.
    pub fn internal(source: impl std::fmt::Display, environment: &Environment) -> Self {
        if environment.exposes_detail() {
            ApiError::Internal(source.to_string())
        } else {
            ApiError::Internal("Internal server error".to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the `error` field.
    fn code(&self) -> &'static str {
        match self {
            ApiError::RateLimited => "rate_limit_exceeded",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Validation(_) => "invalid_request",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::RateLimited => "Too many requests, please try again later".to_string(),
            ApiError::Unauthorized(message)
            | ApiError::Validation(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Internal(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code().to_string(),
            message: Some(self.message()),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Crypto failures surface as 500s. Their display strings are uniform
/// by construction, so they are safe in any environment.
impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::ObjectMissing(_) => ApiError::NotFound("File not found".to_string()),
            _ => ApiError::Internal("Upstream request failed".to_string()),
        }
    }
}
