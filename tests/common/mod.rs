// tests/common/mod.rs
// Shared router and request helpers for the HTTP integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use storyloom::api::router;
use storyloom::config::AppConfig;
use storyloom::db::Database;
use storyloom::state::AppState;

/// Debug-mode config with rate limiting off, so the mock provider path is live.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.debug = true;
    config.rate_limit.enabled = false;
    config
}

/// Router plus the state behind it, for tests that seed the database directly.
pub async fn test_app_and_state(config: AppConfig) -> (Router, Arc<AppState>) {
    let db = Database::in_memory().await.expect("open in-memory database");
    db.migrate().await.expect("apply migrations");
    let state = Arc::new(AppState::new(config, db).expect("build app state"));
    (router(state.clone()), state)
}

pub async fn test_app_with(config: AppConfig) -> Router {
    test_app_and_state(config).await.0
}

pub async fn test_app() -> Router {
    test_app_with(test_config()).await
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body), None).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PUT", uri, Some(body), None).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None, None).await
}

/// Create a novel and return its id.
pub async fn create_novel(app: &Router, title: &str) -> String {
    let (status, body) = post(app, "/api/novels", serde_json::json!({ "title": title })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}
