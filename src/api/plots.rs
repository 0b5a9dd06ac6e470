// src/api/plots.rs

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
use crate::schemas::plot::{PlotCreate, PlotResponse, PlotUpdate};
use crate::schemas::{ListQuery, Validate};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_plots).post(create_plot))
        .route("/{id}", get(get_plot).put(update_plot).delete(delete_plot))
}

fn plot_not_found() -> AppError {
    AppError::not_found("Plot not found")
}

/// GET /api/plots?novel_id=
///
/// Ordered by `order_index`.
async fn list_plots(
    State(app): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<PlotResponse>>> {
    let (skip, limit) = query.paging()?;
    let rows = app
        .db
        .list_plots(query.novel_id.as_deref(), skip, limit)
        .await?;
    Ok(Json(rows.into_iter().map(PlotResponse::from).collect()))
}

/// POST /api/plots
async fn create_plot(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PlotCreate>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    if !app.db.novel_exists(&payload.novel_id).await? {
        return Err(AppError::not_found("Novel not found"));
    }
    let row = app.db.insert_plot(&payload).await?;
    Ok((StatusCode::CREATED, Json(PlotResponse::from(row))))
}

async fn get_plot(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<PlotResponse>> {
    let row = app.db.get_plot(id).await?.ok_or_else(plot_not_found)?;
    Ok(Json(row.into()))
}

async fn update_plot(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<PlotUpdate>,
) -> AppResult<Json<PlotResponse>> {
    payload.validate()?;
    let mut row = app.db.get_plot(id).await?.ok_or_else(plot_not_found)?;
    payload.apply(&mut row);
    Ok(Json(app.db.update_plot(&row).await?.into()))
}

async fn delete_plot(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !app.db.delete_plot(id).await? {
        return Err(plot_not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
