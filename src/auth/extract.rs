// src/auth/extract.rs
// Request extractors resolving the bearer token to a user or admin

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use std::sync::Arc;
use tracing::{debug, info};

use super::jwt::{Claims, verify_token};
use super::password::hash_password;
use crate::db::{AdminRow, UserRow};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const DEMO_USERNAME: &str = "demo";

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

fn claims_from(state: &AppState, token: &str) -> AppResult<Claims> {
    verify_token(&state.config.auth, token).map_err(|e| {
        debug!(error = %e, "rejected bearer token");
        AppError::unauthorized(INVALID_CREDENTIALS)
    })
}

async fn user_from_token(state: &AppState, token: &str) -> AppResult<UserRow> {
    let claims = claims_from(state, token)?;
    if claims.is_admin_token() {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }
    let id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let user = state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    if !user.is_active {
        return Err(AppError::forbidden("Inactive user"));
    }
    Ok(user)
}

async fn admin_from_token(state: &AppState, token: &str) -> AppResult<AdminRow> {
    let claims = claims_from(state, token)?;
    if !claims.is_admin_token() {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let admin = state
        .db
        .get_admin(&claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("Admin not found"))?;
    if !admin.is_active {
        return Err(AppError::forbidden("Inactive admin"));
    }
    Ok(admin)
}

/// The admin behind the request's bearer token, if one was sent.
pub async fn optional_admin(state: &AppState, headers: &HeaderMap) -> AppResult<Option<AdminRow>> {
    match bearer_token(headers) {
        Some(token) => admin_from_token(state, token).await.map(Some),
        None => Ok(None),
    }
}

async fn demo_user(state: &AppState) -> AppResult<UserRow> {
    if let Some(user) = state.db.get_user_by_username(DEMO_USERNAME).await? {
        return Ok(user);
    }

    // unusable password: the demo account is only reachable through this fallback
    let hashed = hash_password(&uuid::Uuid::new_v4().to_string()).await?;
    match state.db.insert_user(DEMO_USERNAME, None, &hashed, false).await {
        Ok(user) => {
            info!("created demo user");
            Ok(user)
        }
        // lost a creation race with a concurrent request
        Err(e) => state
            .db
            .get_user_by_username(DEMO_USERNAME)
            .await?
            .ok_or(AppError::Storage(e)),
    }
}

/// Any active, authenticated user.
pub struct CurrentUser(pub UserRow);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
        user_from_token(state, token).await.map(Self)
    }
}

/// An authenticated user with the `is_admin` flag.
pub struct AdminUser(pub UserRow);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::forbidden("Admin privileges required"));
        }
        Ok(Self(user))
    }
}

/// The authenticated user, or the shared demo user when the request carries
/// no token and `DEMO_USER_ENABLED` is set.
pub struct UserOrDemo(pub UserRow);

impl FromRequestParts<Arc<AppState>> for UserOrDemo {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            Some(token) => user_from_token(state, token).await.map(Self),
            None if state.config.auth.demo_user_enabled => demo_user(state).await.map(Self),
            None => Err(AppError::unauthorized("Not authenticated")),
        }
    }
}

/// An active platform admin (admin-kind token).
pub struct CurrentAdmin(pub AdminRow);

impl FromRequestParts<Arc<AppState>> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
        admin_from_token(state, token).await.map(Self)
    }
}

pub struct SuperAdmin(pub AdminRow);

impl FromRequestParts<Arc<AppState>> for SuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAdmin(admin) = CurrentAdmin::from_request_parts(parts, state).await?;
        if !admin.is_superuser {
            return Err(AppError::forbidden("Superuser privileges required"));
        }
        Ok(Self(admin))
    }
}
