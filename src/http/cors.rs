//! Environment-gated CORS policy.
//!
//! Development is permissive so local frontends can talk to the
//! gateway from any port. Production only honors the configured
//! allow-list, which may contain wildcard-subdomain patterns like
//! `https://*.example.com`; an empty list means same-origin only.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tower_http::cors::CorsLayer;

use crate::config::Environment;

/// Whether `origin` satisfies one allow-list entry. Entries are either
/// literal origins or wildcard-subdomain patterns.
fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once("*.") {
        Some((scheme, domain)) => origin
            .strip_prefix(scheme)
            .and_then(|host| host.strip_suffix(domain))
            .is_some_and(|subdomains| subdomains.len() > 1 && subdomains.ends_with('.')),
        None => pattern == origin,
    }
}

/// Build the CORS layer for the configured environment.
///
/// Rejected origins are logged; browsers only see the absence of the
/// allow header.
pub fn build_cors_layer(environment: &Environment, allowed_origins: &[String]) -> CorsLayer {
    use tower_http::cors::AllowOrigin;

    let allow_origin = match environment {
        Environment::Development => AllowOrigin::any(),
        Environment::Production => {
            let allowed: Vec<String> = allowed_origins.to_vec();
            AllowOrigin::predicate(
                move |origin: &HeaderValue, _req: &axum::http::request::Parts| {
                    let Ok(origin) = origin.to_str() else {
                        return false;
                    };
                    let is_allowed = allowed.iter().any(|pattern| origin_matches(pattern, origin));
                    if !is_allowed {
                        tracing::warn!(origin = %origin, "CORS origin rejected");
                    }
                    is_allowed
                },
            )
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            axum::http::HeaderName::from_static("apikey"),
            axum::http::HeaderName::from_static("x-request-id"),
        ])
}

/// Outermost middleware normalizing preflight responses to 204.
///
/// The CORS layer answers preflights with 200 and an empty body; the
/// public contract promises 204 No Content.
pub async fn normalize_preflight(request: Request<Body>, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
