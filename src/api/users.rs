// src/api/users.rs
// Writer accounts: self lookup plus admin-only management

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;
use tracing::info;

use super::ApiJson;
use crate::auth::{AdminUser, CurrentUser, hash_password};
use crate::error::{AppError, AppResult};
use crate::schemas::account::{UserCreate, UserResponse, UserUpdate};
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(me))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

fn user_not_found() -> AppError {
    AppError::not_found("User not found")
}

/// GET /users/me
async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

async fn list_users(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app.db.list_users(skip, limit).await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

/// POST /users
async fn create_user(
    State(app): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(payload): ApiJson<UserCreate>,
) -> AppResult<impl IntoResponse> {
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
        .insert_user(
            &payload.username,
            payload.email.as_deref(),
            &hashed,
            payload.is_admin,
        )
        .await
        .map_err(|e| AppError::duplicate_or_storage(e, "Username or email already registered"))?;
    info!(user_id = user.id, created_by = admin.id, "created user");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn get_user(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = app.db.get_user(id).await?.ok_or_else(user_not_found)?;
    Ok(Json(user.into()))
}

async fn update_user(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;
    let mut user = app.db.get_user(id).await?.ok_or_else(user_not_found)?;

    if let Some(email) = payload.email {
        if app.db.user_email_taken(&email, Some(id)).await? {
            return Err(AppError::validation("Email already registered"));
        }
        user.email = Some(email);
    }
    if let Some(password) = &payload.password {
        user.hashed_password = hash_password(password).await?;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }
    if let Some(is_admin) = payload.is_admin {
        user.is_admin = is_admin;
    }

    Ok(Json(app.db.update_user(&user).await?.into()))
}

async fn delete_user(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_user(id).await? {
        return Err(user_not_found());
    }
    info!(user_id = id, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}
