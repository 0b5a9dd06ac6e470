// src/api/worlds.rs
// World settings: at most one per novel

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
use crate::error::{AppError, AppResult};
use crate::schemas::world::{WorldSettingCreate, WorldSettingResponse, WorldSettingUpdate};
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_worlds).post(create_world))
        .route("/novel/{novel_id}", get(get_world_for_novel))
        .route("/{id}", get(get_world).put(update_world).delete(delete_world))
}

fn world_not_found() -> AppError {
    AppError::not_found("World setting not found")
}

async fn list_worlds(
    State(app): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<WorldSettingResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app
        .db
        .list_world_settings(query.novel_id.as_deref(), skip, limit)
        .await?;
    Ok(Json(rows.into_iter().map(WorldSettingResponse::from).collect()))
}

/// GET /api/worlds/novel/{novel_id}
async fn get_world_for_novel(
    State(app): State<Arc<AppState>>,
    Path(novel_id): Path<String>,
) -> AppResult<Json<WorldSettingResponse>> {
    let row = app
        .db
        .get_world_setting_for_novel(&novel_id)
        .await?
        .ok_or_else(world_not_found)?;
    Ok(Json(row.into()))
}

/// POST /api/worlds
///
/// 400 when the novel already has a world setting.
async fn create_world(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<WorldSettingCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    if !app.db.novel_exists(&payload.novel_id).await? {
        return Err(AppError::not_found("Novel not found"));
    }
    if app
        .db
        .get_world_setting_for_novel(&payload.novel_id)
        .await?
        .is_some()
    {
        return Err(AppError::validation(
            "World setting already exists for this novel",
        ));
    }

    let row = app
        .db
        .insert_world_setting(payload)
        .await
        .map_err(|e| AppError::duplicate_or_storage(e, "World setting already exists for this novel"))?;
    info!(novel_id = %row.novel_id, "created world setting");
    Ok((StatusCode::CREATED, Json(WorldSettingResponse::from(row))))
}

async fn get_world(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<WorldSettingResponse>> {
    let row = app
        .db
        .get_world_setting(id)
        .await?
        .ok_or_else(world_not_found)?;
    Ok(Json(row.into()))
}

async fn update_world(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<WorldSettingUpdate>,
) -> AppResult<Json<WorldSettingResponse>> {
    payload.validate()?;
    let mut row = app
        .db
        .get_world_setting(id)
        .await?
        .ok_or_else(world_not_found)?;
    payload.apply(&mut row);
    Ok(Json(app.db.update_world_setting(&row).await?.into()))
}

async fn delete_world(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_world_setting(id).await? {
        return Err(world_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
