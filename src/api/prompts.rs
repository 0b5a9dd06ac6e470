// src/api/prompts.rs
// Shared prompt library: readable by any user, managed by admin users

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use super::ApiJson;
use crate::auth::{AdminUser, UserOrDemo};
use crate::error::{AppError, AppResult};
use crate::schemas::prompt::{PromptCreate, PromptResponse, PromptUpdate};
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_prompts).post(create_prompt))
        .route("/name/{name}", get(get_prompt_by_name))
        .route(
            "/{id}",
            get(get_prompt).put(update_prompt).delete(delete_prompt),
        )
}

fn prompt_not_found() -> AppError {
    AppError::not_found("Prompt not found")
}

async fn list_prompts(
    State(app): State<Arc<AppState>>,
    _user: UserOrDemo,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<PromptResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app.db.list_prompts(skip, limit).await?;
    Ok(Json(rows.into_iter().map(PromptResponse::from).collect()))
}

async fn get_prompt(
    State(app): State<Arc<AppState>>,
    _user: UserOrDemo,
    Path(id): Path<i64>,
) -> AppResult<Json<PromptResponse>> {
    let row = app.db.get_prompt(id).await?.ok_or_else(prompt_not_found)?;
    Ok(Json(row.into()))
}

/// GET /prompts/name/{name}
async fn get_prompt_by_name(
    State(app): State<Arc<AppState>>,
    _user: UserOrDemo,
    Path(name): Path<String>,
) -> AppResult<Json<PromptResponse>> {
    let row = app
        .db
        .get_prompt_by_name(&name)
        .await?
        .ok_or_else(prompt_not_found)?;
    Ok(Json(row.into()))
}

/// POST /prompts
async fn create_prompt(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<PromptCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    if app.db.prompt_name_taken(&payload.name, None).await? {
        return Err(AppError::validation("Prompt name already exists"));
    }
    let row = app
        .db
        .insert_prompt(&payload)
        .await
        .map_err(|e| AppError::duplicate_or_storage(e, "Prompt name already exists"))?;
    Ok((StatusCode::CREATED, Json(PromptResponse::from(row))))
}

async fn update_prompt(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<PromptUpdate>,
) -> AppResult<Json<PromptResponse>> {
    payload.validate()?;
    let mut row = app.db.get_prompt(id).await?.ok_or_else(prompt_not_found)?;
    if let Some(name) = &payload.name
        && app.db.prompt_name_taken(name, Some(id)).await?
    {
        return Err(AppError::validation("Prompt name already exists"));
    }
    payload.apply(&mut row);
    Ok(Json(app.db.update_prompt(&row).await?.into()))
}

async fn delete_prompt(
    State(app): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_prompt(id).await? {
        return Err(prompt_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
