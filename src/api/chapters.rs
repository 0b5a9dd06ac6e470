// src/api/chapters.rs

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
use crate::schemas::chapter::{ChapterCreate, ChapterResponse, ChapterUpdate};
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_chapters).post(create_chapter))
        .route(
            "/{id}",
            get(get_chapter).put(update_chapter).delete(delete_chapter),
        )
}

pub(crate) fn chapter_not_found() -> AppError {
    AppError::not_found("Chapter not found")
}

/// GET /api/chapters?novel_id=
///
/// Ordered by chapter number. Duplicate numbers are allowed and fall back to
/// creation order.
async fn list_chapters(
    State(app): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ChapterResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app
        .db
        .list_chapters(query.novel_id.as_deref(), skip, limit)
        .await?;
    Ok(Json(rows.into_iter().map(ChapterResponse::from).collect()))
}

/// POST /api/chapters
async fn create_chapter(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ChapterCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    if !app.db.novel_exists(&payload.novel_id).await? {
        return Err(AppError::not_found("Novel not found"));
    }
    let row = app.db.insert_chapter(&payload).await?;
    Ok((StatusCode::CREATED, Json(ChapterResponse::from(row))))
}

async fn get_chapter(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<ChapterResponse>> {
    let row = app.db.get_chapter(id).await?.ok_or_else(chapter_not_found)?;
    Ok(Json(row.into()))
}

async fn update_chapter(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<ChapterUpdate>,
) -> AppResult<Json<ChapterResponse>> {
    payload.validate()?;
    let mut row = app.db.get_chapter(id).await?.ok_or_else(chapter_not_found)?;
    payload.apply(&mut row);
    Ok(Json(app.db.update_chapter(&row).await?.into()))
}

/// DELETE /api/chapters/{id}
///
/// Versions and evaluations go with the chapter.
async fn delete_chapter(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_chapter(id).await? {
        return Err(chapter_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
