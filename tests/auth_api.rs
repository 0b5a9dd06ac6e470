// tests/auth_api.rs

mod common;

use axum::Router;
use axum::http::StatusCode;
use serde_json::json;

use common::{get, post, send, test_app, test_app_with, test_config};

async fn login(app: &Router, uri: &str, username: &str, password: &str) -> String {
    let (status, body) = post(
        app,
        uri,
        json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app().await;

    let (status, user) = post(
        &app,
        "/auth/register",
        json!({ "username": "writer", "email": "writer@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["is_admin"], false);
    assert!(user.get("hashed_password").is_none());

    let (status, body) = post(
        &app,
        "/auth/register",
        json!({ "username": "writer", "password": "secret2" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already registered");

    let token = login(&app, "/auth/login", "writer", "secret1").await;
    let (status, me) = send(&app, "GET", "/users/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "writer");
}

#[tokio::test]
async fn test_bad_credentials_and_missing_token() {
    let app = test_app().await;
    post(
        &app,
        "/auth/register",
        json!({ "username": "writer", "password": "secret1" }),
    )
    .await;

    let (status, body) = post(
        &app,
        "/auth/login",
        json!({ "username": "writer", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect username or password");

    let (status, _) = get(&app, "/users/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/users/me", None, Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_can_be_disabled() {
    let mut config = test_config();
    config.auth.allow_user_registration = false;
    let app = test_app_with(config).await;

    let (status, body) = post(
        &app,
        "/auth/register",
        json!({ "username": "writer", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Registration is disabled");
}

#[tokio::test]
async fn test_first_admin_is_superuser_then_registration_is_guarded() {
    let app = test_app().await;

    let (status, root) = post(
        &app,
        "/api/admin/register",
        json!({ "username": "root", "email": "root@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(root["is_superuser"], true);

    let second = json!({ "username": "editor", "email": "editor@example.com", "password": "secret1" });
    let (status, body) = post(&app, "/api/admin/register", second.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Only superusers can create new admin accounts");

    let token = login(&app, "/api/admin/login", "root", "secret1").await;
    let (status, editor) = send(&app, "POST", "/api/admin/register", Some(second), Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(editor["is_superuser"], false);

    let (status, me) = send(&app, "GET", "/api/admin/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(me["last_login"].is_string());
}

#[tokio::test]
async fn test_concurrent_first_admin_registrations() {
    let app = test_app().await;
    let root = json!({ "username": "root", "email": "root@example.com", "password": "secret1" });
    let other = json!({ "username": "other", "email": "other@example.com", "password": "secret1" });

    let ((first, _), (second, _)) = tokio::join!(
        post(&app, "/api/admin/register", root),
        post(&app, "/api/admin/register", other),
    );
    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::FORBIDDEN]);
}

#[tokio::test]
async fn test_user_token_is_not_an_admin_token() {
    let app = test_app().await;
    post(
        &app,
        "/auth/register",
        json!({ "username": "writer", "password": "secret1" }),
    )
    .await;
    let token = login(&app, "/auth/login", "writer", "secret1").await;

    let (status, _) = send(&app, "GET", "/api/admin/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/users", None, Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Admin privileges required");
}

#[tokio::test]
async fn test_admin_cannot_delete_itself() {
    let app = test_app().await;
    let (_, root) = post(
        &app,
        "/api/admin/register",
        json!({ "username": "root", "email": "root@example.com", "password": "secret1" }),
    )
    .await;
    let token = login(&app, "/api/admin/login", "root", "secret1").await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/admin/admins/{}", root["id"].as_str().unwrap()),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cannot delete your own account");

    let (status, stats) = send(&app, "GET", "/api/admin/stats", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_admins"], 1);
}
