// src/api/admin.rs
// Platform admin accounts, statistics and the admin novel listing

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::ApiJson;
use crate::auth::{
    CurrentAdmin, KIND_ADMIN, SuperAdmin, create_token, hash_password, optional_admin,
    verify_password,
};
use crate::error::{AppError, AppResult};
use crate::schemas::account::{
    AdminCreate, AdminResponse, AdminStats, AdminUpdate, LoginRequest, StatusCountResponse,
    TokenResponse,
};
use crate::schemas::novel::NovelResponse;
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/admins", get(list_admins))
        .route("/admins/{id}", put(update_admin).delete(delete_admin))
        .route("/stats", get(stats))
        .route("/novels", get(list_novels))
}

const DUPLICATE_ADMIN: &str = "Username or email already registered";

fn admin_not_found() -> AppError {
    AppError::not_found("Admin not found")
}

/// POST /api/admin/login
async fn login(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let admin = match app.db.get_admin_by_username(&payload.username).await? {
        Some(a) if verify_password(&payload.password, &a.hashed_password).await => Some(a),
        _ => None,
    };

    let Some(admin) = admin else {
        warn!(username = %payload.username, "failed admin login attempt");
        return Err(AppError::unauthorized("Incorrect username or password"));
    };
    if !admin.is_active {
        return Err(AppError::forbidden("Admin account is inactive"));
    }

    app.db.touch_admin_login(&admin.id).await?;
    let token = create_token(&app.config.auth, &admin.id, KIND_ADMIN)?;
    info!(username = %admin.username, "admin logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

/// POST /api/admin/register
///
/// The very first admin registers without credentials and is always a
/// superuser. Afterwards a superuser token is required.
async fn register(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<AdminCreate>,
) -> AppResult<impl IntoResponse> {
    let first_admin = app.db.count_admins().await? == 0;
    if !first_admin {
        let caller = optional_admin(&app, &headers).await?;
        if !caller.is_some_and(|a| a.is_superuser) {
            return Err(AppError::forbidden(
                "Only superusers can create new admin accounts",
            ));
        }
    }

    payload.validate()?;
    if app
        .db
        .admin_identity_taken(&payload.username, &payload.email)
        .await?
    {
        return Err(AppError::validation(DUPLICATE_ADMIN));
    }

    let hashed = hash_password(&payload.password).await?;
    let full_name = payload.full_name.as_deref();
    let inserted = if first_admin {
        app.db
            .insert_first_admin(&payload.username, &payload.email, &hashed, full_name)
            .await
    } else {
        app.db
            .insert_admin(
                &payload.username,
                &payload.email,
                &hashed,
                full_name,
                payload.is_superuser,
            )
            .await
            .map(Some)
    }
    .map_err(|e| AppError::duplicate_or_storage(e, DUPLICATE_ADMIN))?;

    // Another first admin got in between the count and the insert
    let Some(admin) = inserted else {
        return Err(AppError::forbidden(
            "Only superusers can create new admin accounts",
        ));
    };
    info!(username = %admin.username, superuser = admin.is_superuser, "registered admin");
    Ok((StatusCode::CREATED, Json(AdminResponse::from(admin))))
}

async fn me(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminResponse> {
    Json(admin.into())
}

/// GET /api/admin/admins
async fn list_admins(
    State(app): State<Arc<AppState>>,
    _superuser: SuperAdmin,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<AdminResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app.db.list_admins(skip, limit).await?;
    Ok(Json(rows.into_iter().map(AdminResponse::from).collect()))
}

/// PUT /api/admin/admins/{id}
///
/// Admins may edit themselves; editing others, or touching `is_active` /
/// `is_superuser`, needs a superuser.
async fn update_admin(
    State(app): State<Arc<AppState>>,
    CurrentAdmin(caller): CurrentAdmin,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<AdminUpdate>,
) -> AppResult<Json<AdminResponse>> {
    payload.validate()?;
    let mut admin = app.db.get_admin(&id).await?.ok_or_else(admin_not_found)?;

    if !caller.is_superuser && (admin.id != caller.id || payload.touches_privileges()) {
        return Err(AppError::forbidden("Not enough privileges"));
    }

    if let Some(email) = payload.email {
        if app.db.admin_email_taken(&email, &admin.id).await? {
            return Err(AppError::validation("Email already registered"));
        }
        admin.email = email;
    }
    if let Some(full_name) = payload.full_name {
        admin.full_name = Some(full_name);
    }
    if let Some(password) = &payload.password {
        admin.hashed_password = hash_password(password).await?;
    }
    if let Some(is_active) = payload.is_active {
        admin.is_active = is_active;
    }
    if let Some(is_superuser) = payload.is_superuser {
        admin.is_superuser = is_superuser;
    }

    let admin = app.db.update_admin(&admin).await?;
    info!(admin_id = %admin.id, updated_by = %caller.id, "updated admin");
    Ok(Json(admin.into()))
}

/// DELETE /api/admin/admins/{id}
async fn delete_admin(
    State(app): State<Arc<AppState>>,
    SuperAdmin(caller): SuperAdmin,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if id == caller.id {
        return Err(AppError::validation("Cannot delete your own account"));
    }
    if !app.db.delete_admin(&id).await? {
        return Err(admin_not_found());
    }
    info!(admin_id = %id, "deleted admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/stats
async fn stats(
    State(app): State<Arc<AppState>>,
    _admin: CurrentAdmin,
) -> AppResult<Json<AdminStats>> {
    let by_status = app.db.count_novels_by_status().await?;
    let total_novels = by_status.iter().map(|c| c.count).sum();

    Ok(Json(AdminStats {
        total_novels,
        novels_by_status: by_status
            .into_iter()
            .map(|c| StatusCountResponse {
                status: c.status,
                count: c.count,
            })
            .collect(),
        total_admins: app.db.count_admins().await?,
        total_users: app.db.count_users().await?,
    }))
}

/// GET /api/admin/novels
async fn list_novels(
    State(app): State<Arc<AppState>>,
    _admin: CurrentAdmin,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<NovelResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app.db.list_novels(skip, limit).await?;
    Ok(Json(rows.into_iter().map(NovelResponse::from).collect()))
}
