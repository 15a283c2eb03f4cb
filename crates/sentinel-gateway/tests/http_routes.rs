// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sentinel_gate::{AccessGate, CredentialHasher, MemoryUserStore, TokenIssuer};
use sentinel_gateway::{router, AppState};
use sentinel_vault::{KeyMaterial, SecretVault};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &[u8] = b"gateway-test-signing-secret-0123456789abcdef";

fn test_state() -> AppState {
    let vault = SecretVault::new(KeyMaterial::generate().unwrap()).unwrap();
    let gate = AccessGate::new(
        CredentialHasher::new(8, 1, 1).unwrap(),
        TokenIssuer::new(SECRET, Duration::from_secs(1800)).unwrap(),
        Arc::new(MemoryUserStore::new()),
        "user",
    )
    .unwrap();
    AppState::new(vault, gate, "sentinel-test")
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn register(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({"username": username, "password": password}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_reports_operational_vault() {
    let app = router(test_state());
    let (status, body) = send(&app, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vault_status"], "OPERATIONAL");
    assert_eq!(body["service"], "sentinel-test");
}

#[tokio::test]
async fn vault_status_names_algorithm() {
    let app = router(test_state());
    let (status, body) = send(&app, get("/vault/status", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["encryption"], "AES-256-GCM");
    assert_eq!(body["key_fingerprint"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn health_report_has_host_fields() {
    let app = router(test_state());
    let (status, body) = send(&app, get("/audit/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SECURE");
    for field in ["timestamp", "os", "node", "os_version"] {
        assert!(body[field].is_string(), "missing {field}");
    }
    assert!(body["uptime_secs"].is_u64());
}

#[tokio::test]
async fn register_returns_bearer_grant() {
    let app = router(test_state());
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({"username": "alice", "password": "pw123", "role": "user"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("hashed_password").is_none());
}

#[tokio::test]
async fn duplicate_and_blank_registrations_are_rejected() {
    let app = router(test_state());
    register(&app, "alice", "pw123").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({"username": "alice", "password": "x"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].is_string());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({"username": "", "password": "x"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let state = test_state();
    let app = router(state.clone());
    register(&app, "alice", "pw123").await;

    let (ok_status, ok_body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({"username": "alice", "password": "pw123"}),
            None,
        ),
    )
    .await;
    assert_eq!(ok_status, StatusCode::OK);
    assert!(ok_body["access_token"].is_string());

    let wrong = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({"username": "alice", "password": "wrongpw"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.headers()[header::WWW_AUTHENTICATE], "Bearer");
    let wrong_body = wrong.into_body().collect().await.unwrap().to_bytes();

    let (unknown_status, unknown_body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({"username": "nobody", "password": "pw123"}),
            None,
        ),
    )
    .await;
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        serde_json::from_slice::<Value>(&wrong_body).unwrap(),
        unknown_body
    );
    assert_eq!(state.health.auth_failures(), 2);
}

#[tokio::test]
async fn vault_routes_require_bearer_token() {
    let app = router(test_state());
    let (status, body) = send(
        &app,
        json_request("POST", "/vault/encrypt", json!({"secret": "x"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "could not validate credentials");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/vault/encrypt",
            json!({"secret": "x"}),
            Some("not.a.token"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn encrypt_then_decrypt_over_http() {
    let app = router(test_state());
    let token = register(&app, "ops", "pw").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/vault/encrypt",
            json!({"secret": "SentinelCloud_Admin_Pass_2026"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let encrypted = body["encrypted"].as_str().unwrap().to_string();
    assert!(body["timestamp"].is_string());
    assert_ne!(encrypted, "SentinelCloud_Admin_Pass_2026");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/vault/decrypt",
            json!({"secret": encrypted}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decrypted"], "SentinelCloud_Admin_Pass_2026");
}

#[tokio::test]
async fn bad_payload_decrypt_is_opaque_400() {
    let app = router(test_state());
    let token = register(&app, "ops", "pw").await;
    let foreign = SecretVault::new(KeyMaterial::generate().unwrap())
        .unwrap()
        .encrypt("x")
        .unwrap();

    let mut details = Vec::new();
    for payload in ["garbage", foreign.as_str()] {
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/vault/decrypt",
                json!({"secret": payload}),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        details.push(body["detail"].clone());
    }
    assert_eq!(details[0], details[1]);
}

#[tokio::test]
async fn me_returns_token_identity() {
    let app = router(test_state());
    let token = register(&app, "alice", "pw123").await;

    let (status, body) = send(&app, get("/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "alice");
    assert_eq!(body["role"], "user");
    assert!(body["expiry"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn malformed_bodies_get_detail_errors() {
    let app = router(test_state());

    let raw = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": \"alice\""))
        .unwrap();
    let (status, body) = send(&app, raw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string(), "{body}");

    let (status, body) = send(
        &app,
        json_request("POST", "/auth/register", json!({"username": "alice"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("password"), "{body}");

    let untyped = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .body(Body::from(json!({"username": "a", "password": "b"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, untyped).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["detail"].is_string(), "{body}");
}
