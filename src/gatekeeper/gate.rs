//! The gatekeeper middleware itself.
//!
//! Runs every request through the strict sequence
//! `rate check → route classify → auth check → handler → audit`,
//! producing exactly one audit entry per request no matter which
//! branch terminates it.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::audit::{unix_timestamp, AuditLogEntry, AuditLogger};
use crate::gatekeeper::{RateLimiter, RouteTable, TokenValidator};
use crate::http::error::ApiError;
use crate::http::request::{client_origin, user_agent, RequestIdExt};
use crate::observability::metrics;

/// Shared state for the gate middleware.
pub struct GateState {
    pub rate_limiter: RateLimiter,
    pub validator: TokenValidator,
    pub routes: RouteTable,
    pub audit: AuditLogger,
}

/// Authenticated subject for the current request, inserted by the gate
/// before the handler runs. Public routes carry `subject_id: None`.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub subject_id: Option<String>,
}

/// Audit action name for a request path (`/secure-encrypt/test` →
/// `secure-encrypt:test`).
fn route_action(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed.replace('/', ":")
    }
}

/// Gate middleware: rate limit, classify, authenticate, run the
/// handler, then audit the outcome.
pub async fn secure_request(
    State(gate): State<Arc<GateState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let action = route_action(&path);
    let origin = client_origin(request.headers());
    let agent = user_agent(request.headers());
    let correlation_id = request.headers().request_id();

    // 1. Rate check, before any classification.
    if gate.rate_limiter.is_rate_limited(&origin) {
        tracing::warn!(
            request_id = %correlation_id,
            origin = %origin,
            path = %path,
            "Rate limit exceeded"
        );
        metrics::record_rate_limited("fixed_window");

        let response = ApiError::RateLimited.into_response();
        audit_outcome(
            &gate.audit,
            &action,
            None,
            &method,
            &path,
            response.status().as_u16(),
            "rate_limited",
            &origin,
            &agent,
            &correlation_id,
            started,
        )
        .await;
        return response;
    }

    // 2. Route classification: allow-listed routes skip auth.
    let mut subject_id = None;
    if !gate.routes.is_public(&method, &path) {
        // 3. Auth check for protected routes.
        let validation = gate.validator.validate(request.headers()).await;
        if !validation.is_valid {
            let message = validation
                .error
                .unwrap_or_else(|| "Missing or invalid authorization header".to_string());
            tracing::debug!(
                request_id = %correlation_id,
                path = %path,
                "Rejecting unauthenticated request"
            );

            let response = ApiError::Unauthorized(message).into_response();
            audit_outcome(
                &gate.audit,
                &action,
                None,
                &method,
                &path,
                response.status().as_u16(),
                "unauthorized",
                &origin,
                &agent,
                &correlation_id,
                started,
            )
            .await;
            return response;
        }
        subject_id = validation.subject_id;
    }

    request.extensions_mut().insert(AuthContext {
        subject_id: subject_id.clone(),
    });

    // 4. Handler runs; its errors arrive here already shaped as
    //    responses, so the status alone decides the outcome.
    let response = next.run(request).await;

    let status = response.status().as_u16();
    let outcome = if status >= 500 { "handler_error" } else { "ok" };
    audit_outcome(
        &gate.audit,
        &action,
        subject_id,
        &method,
        &path,
        status,
        outcome,
        &origin,
        &agent,
        &correlation_id,
        started,
    )
    .await;

    response
}

#[allow(clippy::too_many_arguments)]
async fn audit_outcome(
    audit: &AuditLogger,
    action: &str,
    actor_id: Option<String>,
    method: &axum::http::Method,
    path: &str,
    status: u16,
    outcome: &str,
    origin: &str,
    agent: &str,
    correlation_id: &str,
    started: Instant,
) {
    metrics::record_request(action, status);
    metrics::record_request_duration(action, started.elapsed().as_secs_f64());
    audit
        .record(AuditLogEntry {
            action: action.to_string(),
            actor_id,
            metadata: json!({
                "method": method.as_str(),
                "path": path,
                "status": status,
                "outcome": outcome,
                "requestId": correlation_id,
            }),
            origin_address: origin.to_string(),
            user_agent: agent.to_string(),
            timestamp: unix_timestamp(),
        })
        .await;
}
