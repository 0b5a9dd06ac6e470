// src/api/characters.rs

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use super::ApiJson;
use crate::error::{AppError, AppResult};
use crate::schemas::character::{CharacterCreate, CharacterResponse, CharacterUpdate};
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_characters).post(create_character))
        .route(
            "/{id}",
            get(get_character).put(update_character).delete(delete_character),
        )
}

fn character_not_found() -> AppError {
    AppError::not_found("Character not found")
}

/// GET /api/characters?novel_id=
async fn list_characters(
    State(app): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<CharacterResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app
        .db
        .list_characters(query.novel_id.as_deref(), skip, limit)
        .await?;
    Ok(Json(rows.into_iter().map(CharacterResponse::from).collect()))
}

/// POST /api/characters
async fn create_character(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CharacterCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    if !app.db.novel_exists(&payload.novel_id).await? {
        return Err(AppError::not_found("Novel not found"));
    }
    let row = app.db.insert_character(&payload).await?;
    Ok((StatusCode::CREATED, Json(CharacterResponse::from(row))))
}

async fn get_character(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<CharacterResponse>> {
    let row = app
        .db
        .get_character(id)
        .await?
        .ok_or_else(character_not_found)?;
    Ok(Json(row.into()))
}

async fn update_character(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<CharacterUpdate>,
) -> AppResult<Json<CharacterResponse>> {
    payload.validate()?;
    let mut row = app
        .db
        .get_character(id)
        .await?
        .ok_or_else(character_not_found)?;
    payload.apply(&mut row);
    Ok(Json(app.db.update_character(&row).await?.into()))
}

async fn delete_character(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_character(id).await? {
        return Err(character_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
