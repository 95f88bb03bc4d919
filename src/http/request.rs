//! Request identity and client metadata extraction.
//!
//! # Responsibilities
//! - Guarantee every request carries an `x-request-id`, generated when
//!   the client did not supply one, and echo it on the response
//! - Extract the client origin used for rate limiting and audit trails
//!
//! # Design Decisions
//! - Request ID added as early as possible for log correlation
//! - Origin comes from forwarding headers, never the socket peer: the
//!   gateway is expected to sit behind a load balancer

use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request},
    response::Response,
};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID of the current request, stored in its extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Read access to the correlation ID from places that only see parts
/// of the request.
pub trait RequestIdExt {
    /// The request's correlation ID, or `"unknown"` when the ID layer
    /// has not run.
    fn request_id(&self) -> String;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> String {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string()
    }
}

impl RequestIdExt for Request<Body> {
    fn request_id(&self) -> String {
        if let Some(RequestId(id)) = self.extensions().get::<RequestId>() {
            return id.clone();
        }
        self.headers().request_id()
    }
}

/// Client identifier for rate limiting and audit entries: first
/// forwarding header that names an address, else `"unknown"`.
pub fn client_origin(headers: &HeaderMap) -> String {
    for name in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            // x-forwarded-for may list every hop; the client is first.
            let first = value.split(',').next().unwrap_or(value).trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// User agent for audit entries.
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Layer that assigns request IDs.
#[derive(Clone, Copy)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service side of [`RequestIdLayer`]: reuses a client-supplied ID,
/// otherwise generates a UUID, then echoes it on the response.
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            request.headers_mut().insert(X_REQUEST_ID, value);
        }
        request
            .extensions_mut()
            .insert(RequestId(request_id.clone()));

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let mut response = inner.call(request).await?;
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use tower::{service_fn, ServiceExt};

    #[test]
    fn test_forwarded_for_wins_over_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_origin(&headers), "203.0.113.5");
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1, 10.0.0.2"),
        );
        assert_eq!(client_origin(&headers), "203.0.113.5");
    }

    #[test]
    fn test_real_ip_used_when_forwarded_for_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_origin(&headers), "198.51.100.7");
    }

    #[test]
    fn test_no_forwarding_headers_yields_sentinel() {
        assert_eq!(client_origin(&HeaderMap::new()), "unknown");
        let headers = HeaderMap::new();
        assert_eq!(headers.request_id(), "unknown");
        assert_eq!(user_agent(&headers), "unknown");
    }

    #[tokio::test]
    async fn test_generated_id_reaches_inner_service_and_response() {
        let svc = RequestIdLayer.layer(service_fn(|request: Request<Body>| async move {
            assert_ne!(request.request_id(), "unknown");
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }));

        let response = svc
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_client_supplied_id_is_preserved() {
        let svc = RequestIdLayer.layer(service_fn(|request: Request<Body>| async move {
            assert_eq!(request.request_id(), "client-chosen-id");
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }));

        let response = svc
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(X_REQUEST_ID, "client-chosen-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(X_REQUEST_ID),
            Some(&HeaderValue::from_static("client-chosen-id"))
        );
    }
}
