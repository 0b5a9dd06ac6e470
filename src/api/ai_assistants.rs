// src/api/ai_assistants.rs
// Persona-driven generation; each exchange is kept in the novel's history

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

use super::ApiJson;
use crate::assistants::{Assistant, list_assistants};
use crate::error::AppResult;
use crate::prompt::{ContextOptions, build_context};
use crate::schemas::Validate;
use crate::schemas::ai::{
    AssistantInfo, AssistantRequest, AssistantResponse, MultiVersionQuery, MultiVersionResponse,
};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list))
        .route("/generate", post(generate))
        .route("/generate-multiple", post(generate_multiple))
}

/// GET /api/ai-assistants
async fn list() -> Json<Vec<AssistantInfo>> {
    Json(list_assistants())
}

/// POST /api/ai-assistants/generate
async fn generate(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AssistantRequest>,
) -> AppResult<Json<AssistantResponse>> {
    payload.validate()?;
    let assistant = Assistant::create(&payload.role, payload.provider_settings())?;
    let max_tokens = payload
        .max_tokens
        .unwrap_or_else(|| assistant.role().default_max_tokens());
    let context = build_context(&app.db, &payload.novel_id, ContextOptions::all()).await?;

    let result = assistant
        .process(&app.ai, &context, &payload.user_input, max_tokens)
        .await?;

    let role = assistant.role().as_str();
    app.db
        .append_exchange(
            &payload.novel_id,
            role,
            &payload.user_input,
            std::slice::from_ref(&result.content),
        )
        .await?;
    info!(role, novel_id = %payload.novel_id, tokens = result.tokens_used, "assistant replied");

    Ok(Json(AssistantResponse {
        role: role.to_string(),
        content: result.content,
        tokens_used: result.tokens_used,
    }))
}

/// POST /api/ai-assistants/generate-multiple?num_versions=N
///
/// Novelist only; drafts are generated concurrently.
async fn generate_multiple(
    State(app): State<Arc<AppState>>,
    Query(query): Query<MultiVersionQuery>,
    ApiJson(payload): ApiJson<AssistantRequest>,
) -> AppResult<Json<MultiVersionResponse>> {
    payload.validate()?;
    let count = query.count()?;
    let assistant = Assistant::create(&payload.role, payload.provider_settings())?;
    assistant.ensure_multi_version()?;
    let context = build_context(&app.db, &payload.novel_id, ContextOptions::all()).await?;

    let results = assistant
        .process_multiple_versions(&app.ai, &context, &payload.user_input, count)
        .await?;
    let tokens_used = results.iter().map(|r| r.tokens_used).sum();
    let versions: Vec<String> = results.into_iter().map(|r| r.content).collect();

    let role = assistant.role().as_str();
    app.db
        .append_exchange(&payload.novel_id, role, &payload.user_input, &versions)
        .await?;
    info!(count = versions.len(), novel_id = %payload.novel_id, "drafted versions");

    Ok(Json(MultiVersionResponse {
        role: role.to_string(),
        count: versions.len(),
        versions,
        tokens_used,
    }))
}
