// src/api/auth.rs
// Writer registration and login

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::ApiJson;
use crate::auth::{KIND_USER, create_token, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::schemas::Validate;
use crate::schemas::account::{LoginRequest, TokenResponse, UserCreate, UserResponse};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /auth/register
///
/// Self-registered accounts are never admins.
async fn register(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<UserCreate>,
) -> AppResult<impl IntoResponse> {
    if !app.config.auth.allow_user_registration {
        return Err(AppError::forbidden("Registration is disabled"));
    }
    payload.validate()?;

    if app.db.user_username_exists(&payload.username).await? {
        return Err(AppError::validation("Username already registered"));
    }
    if let Some(email) = &payload.email
        && app.db.user_email_taken(email, None).await?
    {
        return Err(AppError::validation("Email already registered"));
    }

    let hashed = hash_password(&payload.password).await?;
    let user = app
        .db
        .insert_user(&payload.username, payload.email.as_deref(), &hashed, false)
        .await
        .map_err(|e| AppError::duplicate_or_storage(e, "Username or email already registered"))?;
    info!(user_id = user.id, "registered user");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /auth/login
async fn login(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = match app.db.get_user_by_username(&payload.username).await? {
        Some(u) if verify_password(&payload.password, &u.hashed_password).await => Some(u),
        _ => None,
    };

    let Some(user) = user else {
        warn!(username = %payload.username, "failed login attempt");
        return Err(AppError::unauthorized("Incorrect username or password"));
    };
    if !user.is_active {
        return Err(AppError::forbidden("Inactive user"));
    }

    let token = create_token(&app.config.auth, &user.id.to_string(), KIND_USER)?;
    Ok(Json(TokenResponse::bearer(token)))
}
