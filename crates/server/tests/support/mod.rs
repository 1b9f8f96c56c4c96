#![allow(dead_code)]
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use configs::AppConfig;
use service::auth::repository::{mock::MockUserRepository, UserRepository};
use tower::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "https://app.example.com";
pub const PASSWORD: &str = "S3curePass!";

pub const SIGNING_PRIVATE_PEM: &[u8] = include_bytes!("../../../service/testdata/signing_private.pem");
pub const SIGNING_PUBLIC_PEM: &[u8] = include_bytes!("../../../service/testdata/signing_public.pem");
pub const FOREIGN_PRIVATE_PEM: &[u8] = include_bytes!("../../../service/testdata/foreign_private.pem");
pub const FOREIGN_PUBLIC_PEM: &[u8] = include_bytes!("../../../service/testdata/foreign_public.pem");

pub fn test_config(lifetime: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.access_token_secret = STANDARD.encode(SIGNING_PRIVATE_PEM);
    cfg.auth.public_access_token_secret = STANDARD.encode(SIGNING_PUBLIC_PEM);
    cfg.auth.access_token_life = lifetime.to_string();
    cfg.cors.allowed_origins = vec![ALLOWED_ORIGIN.to_string()];
    cfg
}

pub fn build_app() -> (Arc<MockUserRepository>, Router) {
    let repo = Arc::new(MockUserRepository::default());
    let dyn_repo: Arc<dyn UserRepository> = repo.clone();
    let app = server::startup::build_app(&test_config("1h"), dyn_repo).expect("build app");
    (repo, app)
}

pub async fn send(app: &Router, req: Request<Body>) -> (Response<Body>, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.expect("router is infallible");
    let (parts, body) = resp.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (Response::from_parts(parts, Body::empty()), json)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

pub fn registration(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "password": PASSWORD,
        "firstName": "Test",
        "lastName": "Breather",
        "email": format!("{username}@example.com"),
        "admin": false
    })
}

/// Register `username` and log in, returning `(user_id, access_token)`.
pub async fn register_and_login(app: &Router, username: &str) -> (String, String) {
    let (resp, body) = send(app, json_request("POST", "/api/v1/register", registration(username))).await;
    assert_eq!(resp.status(), 201, "register failed: {body}");
    let (resp, body) = send(
        app,
        json_request("POST", "/api/v1/login", serde_json::json!({"username": username, "password": PASSWORD})),
    )
    .await;
    assert_eq!(resp.status(), 200, "login failed: {body}");
    (
        body["user_id"].as_str().expect("user_id").to_string(),
        body["access_token"].as_str().expect("access_token").to_string(),
    )
}
