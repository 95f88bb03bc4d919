//! Integration tests for the request gatekeeper pipeline.

use std::sync::atomic::Ordering;

use serde_json::Value;

mod common;

#[tokio::test]
async fn test_public_route_bypasses_auth() {
    let gate = common::spawn_gateway(|_| {}).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("{}/health", gate.url))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);
    assert!(
        res.headers().contains_key("x-request-id"),
        "Responses should carry a request ID"
    );

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    assert_eq!(
        gate.backend.identity_calls.load(Ordering::SeqCst),
        0,
        "Public routes should skip identity verification"
    );
    assert_eq!(
        gate.backend.audit_appends.load(Ordering::SeqCst),
        1,
        "Every request should produce exactly one audit entry"
    );

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_missing_bearer_rejected() {
    let gate = common::spawn_gateway(|_| {}).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("{}/secure-encrypt", gate.url))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 401);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Missing or invalid authorization header");

    assert_eq!(
        gate.backend.identity_calls.load(Ordering::SeqCst),
        0,
        "A missing header should be rejected without an identity call"
    );
    assert_eq!(gate.backend.audit_appends.load(Ordering::SeqCst), 1);

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_rejected_token_gets_generic_message() {
    let gate = common::spawn_gateway(|_| {}).await;
    gate.backend.accept_tokens.store(false, Ordering::SeqCst);

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("{}/secure-encrypt", gate.url))
        .bearer_auth("stale-session-token")
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 401);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(
        body["message"], "Invalid or expired token",
        "Rejected tokens should get a generic message"
    );

    assert_eq!(gate.backend.identity_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gate.backend.audit_appends.load(Ordering::SeqCst), 1);

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_verified_token_reaches_handler() {
    let gate = common::spawn_gateway(|_| {}).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("{}/secure-encrypt", gate.url))
        .bearer_auth("good-session-token")
        .json(&serde_json::json!({"action": "encrypt", "data": "hello"}))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert!(
        body["encryptedData"].is_string(),
        "Handler should run once the token is verified"
    );

    assert_eq!(gate.backend.identity_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gate.backend.audit_appends.load(Ordering::SeqCst), 1);

    let rows = gate.backend.audit_bodies.lock().unwrap();
    assert!(
        rows[0].contains(r#""actorId":"user-123""#),
        "Audit entry should carry the verified actor (got {})",
        rows[0]
    );
    assert!(rows[0].contains(r#""action":"secure-encrypt""#));

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_enforced() {
    let gate = common::spawn_gateway(|config| {
        config.rate_limit.max_requests = 2;
    })
    .await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    for _ in 0..2 {
        let res = client
            .get(format!("{}/health", gate.url))
            .send()
            .await
            .expect("Gateway unreachable");
        assert_eq!(res.status(), 200, "Requests within the budget should pass");
    }

    let res = client
        .get(format!("{}/health", gate.url))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 429);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "rate_limit_exceeded");
    assert_eq!(body["message"], "Too many requests, please try again later");

    assert_eq!(
        gate.backend.audit_appends.load(Ordering::SeqCst),
        3,
        "Rate-limited requests are audited too"
    );

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_route_still_gated() {
    let gate = common::spawn_gateway(|_| {}).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    // Without credentials the gate rejects before routing.
    let res = client
        .get(format!("{}/nope", gate.url))
        .send()
        .await
        .expect("Gateway unreachable");
    assert_eq!(res.status(), 401);

    // With credentials the request reaches the fallback handler.
    let res = client
        .get(format!("{}/nope", gate.url))
        .bearer_auth("good-session-token")
        .send()
        .await
        .expect("Gateway unreachable");
    assert_eq!(res.status(), 404);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Route not found");

    assert_eq!(gate.backend.identity_calls.load(Ordering::SeqCst), 1);

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_handler_error_still_audited() {
    // No encryption key: the handler itself fails after auth passes.
    let gate = common::spawn_gateway(|config| {
        config.encryption.key_hex = String::new();
    })
    .await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("{}/secure-encrypt", gate.url))
        .bearer_auth("good-session-token")
        .json(&serde_json::json!({"action": "encrypt", "data": "x"}))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 500);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "encryption key is not configured");

    assert_eq!(gate.backend.identity_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        gate.backend.audit_appends.load(Ordering::SeqCst),
        1,
        "Failed handlers still produce exactly one audit entry"
    );

    let rows = gate.backend.audit_bodies.lock().unwrap();
    assert!(
        rows[0].contains(r#""outcome":"handler_error""#),
        "Audit entry should mark the handler failure (got {})",
        rows[0]
    );

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_audit_endpoint_writes_two_rows() {
    let gate = common::spawn_gateway(|_| {}).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("{}/audit-log", gate.url))
        .bearer_auth("good-session-token")
        .json(&serde_json::json!({
            "action": "profile_view",
            "metadata": {"jobId": "j-77"},
        }))
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);

    // One row from the handler, one from the gate outcome.
    assert_eq!(gate.backend.audit_appends.load(Ordering::SeqCst), 2);

    let rows = gate.backend.audit_bodies.lock().unwrap();
    assert!(
        rows[0].contains(r#""action":"profile_view""#),
        "Handler row should use the caller-supplied action (got {})",
        rows[0]
    );
    assert!(rows[0].contains(r#""jobId":"j-77""#));

    gate.shutdown.trigger();
}
