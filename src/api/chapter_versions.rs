// src/api/chapter_versions.rs
// Alternative chapter drafts, the selected version and editorial evaluations

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

use super::ApiJson;
use super::chapters::chapter_not_found;
use crate::db::ChapterRow;
use crate::error::{AppError, AppResult};
use crate::schemas::Validate;
use crate::schemas::chapter::{
    ChapterEvaluationCreate, ChapterEvaluationResponse, ChapterVersionCreate,
    ChapterVersionResponse, ChapterWithVersions, SelectVersionResponse,
};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_version))
        .route("/chapter/{chapter_id}", get(list_versions))
        .route(
            "/chapter/{chapter_id}/select/{version_id}",
            post(select_version),
        )
        .route("/chapter/{chapter_id}/with-versions", get(chapter_with_versions))
        .route("/evaluations", post(create_evaluation))
        .route("/evaluations/chapter/{chapter_id}", get(list_evaluations))
        .route("/{version_id}", get(get_version).delete(delete_version))
}

fn version_not_found() -> AppError {
    AppError::not_found("Chapter version not found")
}

async fn require_chapter(app: &AppState, chapter_id: i64) -> AppResult<ChapterRow> {
    app.db
        .get_chapter(chapter_id)
        .await?
        .ok_or_else(chapter_not_found)
}

/// POST /api/chapter-versions
async fn create_version(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ChapterVersionCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    require_chapter(&app, payload.chapter_id).await?;
    let row = app.db.insert_chapter_version(&payload).await?;
    info!(chapter_id = row.chapter_id, version_id = row.id, "created chapter version");
    Ok((StatusCode::CREATED, Json(ChapterVersionResponse::from(row))))
}

/// GET /api/chapter-versions/chapter/{chapter_id}
async fn list_versions(
    State(app): State<Arc<AppState>>,
    Path(chapter_id): Path<i64>,
) -> AppResult<Json<Vec<ChapterVersionResponse>>> {
    require_chapter(&app, chapter_id).await?;
    let rows = app.db.list_chapter_versions(chapter_id).await?;
    Ok(Json(rows.into_iter().map(ChapterVersionResponse::from).collect()))
}

async fn get_version(
    State(app): State<Arc<AppState>>,
    Path(version_id): Path<i64>,
) -> AppResult<Json<ChapterVersionResponse>> {
    let row = app
        .db
        .get_chapter_version(version_id)
        .await?
        .ok_or_else(version_not_found)?;
    Ok(Json(row.into()))
}

/// DELETE /api/chapter-versions/{version_id}
///
/// A chapter whose selected version is deleted keeps its text but loses the
/// selection.
async fn delete_version(
    State(app): State<Arc<AppState>>,
    Path(version_id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_chapter_version(version_id).await? {
        return Err(version_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/chapter-versions/chapter/{chapter_id}/select/{version_id}
async fn select_version(
    State(app): State<Arc<AppState>>,
    Path((chapter_id, version_id)): Path<(i64, i64)>,
) -> AppResult<Json<SelectVersionResponse>> {
    require_chapter(&app, chapter_id).await?;
    app.db
        .select_chapter_version(chapter_id, version_id)
        .await?
        .ok_or_else(|| AppError::not_found("Version not found for this chapter"))?;

    info!(chapter_id, version_id, "selected chapter version");
    Ok(Json(SelectVersionResponse {
        message: "Version selected".to_string(),
        version_id,
    }))
}

/// GET /api/chapter-versions/chapter/{chapter_id}/with-versions
async fn chapter_with_versions(
    State(app): State<Arc<AppState>>,
    Path(chapter_id): Path<i64>,
) -> AppResult<Json<ChapterWithVersions>> {
    let chapter = require_chapter(&app, chapter_id).await?;
    let versions = app.db.list_chapter_versions(chapter_id).await?;
    Ok(Json(ChapterWithVersions {
        chapter: chapter.into(),
        versions: versions.into_iter().map(ChapterVersionResponse::from).collect(),
    }))
}

/// POST /api/chapter-versions/evaluations
async fn create_evaluation(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ChapterEvaluationCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    require_chapter(&app, payload.chapter_id).await?;
    if let Some(version_id) = payload.version_id {
        let version = app
            .db
            .get_chapter_version(version_id)
            .await?
            .filter(|v| v.chapter_id == payload.chapter_id);
        if version.is_none() {
            return Err(AppError::not_found("Version not found for this chapter"));
        }
    }

    let row = app.db.insert_chapter_evaluation(&payload).await?;
    Ok((StatusCode::CREATED, Json(ChapterEvaluationResponse::from(row))))
}

/// GET /api/chapter-versions/evaluations/chapter/{chapter_id}
async fn list_evaluations(
    State(app): State<Arc<AppState>>,
    Path(chapter_id): Path<i64>,
) -> AppResult<Json<Vec<ChapterEvaluationResponse>>> {
    require_chapter(&app, chapter_id).await?;
    let rows = app.db.list_chapter_evaluations(chapter_id).await?;
    Ok(Json(rows.into_iter().map(ChapterEvaluationResponse::from).collect()))
}
