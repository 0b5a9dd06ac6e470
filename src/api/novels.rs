// src/api/novels.rs

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
use crate::schemas::novel::{NovelCreate, NovelResponse, NovelUpdate};
use crate::schemas::prompt::ConversationEntry;
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_novels).post(create_novel))
        .route("/{id}", get(get_novel).put(update_novel).delete(delete_novel))
        .route("/{id}/conversations", get(list_conversations))
}

fn novel_not_found() -> AppError {
    AppError::not_found("Novel not found")
}

/// GET /api/novels
async fn list_novels(
    State(app): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<NovelResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app.db.list_novels(skip, limit).await?;
    Ok(Json(rows.into_iter().map(NovelResponse::from).collect()))
}

/// POST /api/novels
async fn create_novel(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NovelCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    let row = payload.into_row();
    app.db.insert_novel(&row).await?;
    info!(novel_id = %row.id, "created novel");
    Ok((StatusCode::CREATED, Json(NovelResponse::from(row))))
}

/// GET /api/novels/{id}
async fn get_novel(
    State(app): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<NovelResponse>> {
    let row = app.db.get_novel(&id).await?.ok_or_else(novel_not_found)?;
    Ok(Json(row.into()))
}

/// PUT /api/novels/{id}
async fn update_novel(
    State(app): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<NovelUpdate>,
) -> AppResult<Json<NovelResponse>> {
    payload.validate()?;
    let mut row = app.db.get_novel(&id).await?.ok_or_else(novel_not_found)?;
    payload.apply(&mut row);
    let row = app.db.update_novel(&row).await?;
    Ok(Json(row.into()))
}

/// DELETE /api/novels/{id}
///
/// Cascades to characters, plots, chapters (with versions and evaluations),
/// the world setting and conversation history.
async fn delete_novel(
    State(app): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if !app.db.delete_novel(&id).await? {
        return Err(novel_not_found());
    }
    info!(novel_id = %id, "deleted novel");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/novels/{id}/conversations
async fn list_conversations(
    State(app): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ConversationEntry>>> {
    let (skip, limit) = query.paging()?;
    if !app.db.novel_exists(&id).await? {
        return Err(novel_not_found());
    }
    let rows = app.db.list_conversation(&id, skip, limit).await?;
    Ok(Json(rows.into_iter().map(ConversationEntry::from).collect()))
}
