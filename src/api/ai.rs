// src/api/ai.rs
// Context-aware generation endpoints

use axum::{Json, Router, extract::State, routing::post};
use std::sync::Arc;
use tracing::{info, warn};

use super::ApiJson;
use super::chapters::chapter_not_found;
use crate::error::AppResult;
use crate::prompt::templates::{
    chapter_outline_instruction, character_instruction, expand_instruction, plot_instruction,
    summarize_previous_chapters, world_instruction,
};
use crate::prompt::{ContextOptions, GenerationContext, build_context};
use crate::schemas::Validate;
use crate::schemas::ai::{
    AiGenerateRequest, AiGenerateResponse, AiTestRequest, AiTestResponse, ChapterOutlineRequest,
    CharacterGenerateRequest, ExpandContentRequest, PlotGenerateRequest, ProviderSettings,
    WorldGenerateRequest,
};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/generate-character", post(generate_character))
        .route("/generate-plot", post(generate_plot))
        .route("/generate-chapter-outline", post(generate_chapter_outline))
        .route("/expand-content", post(expand_content))
        .route("/generate-world", post(generate_world))
        .route("/test-config", post(test_config))
}

/// Working text of a chapter of `novel_id`, as prior content.
async fn chapter_text(app: &AppState, novel_id: &str, chapter_id: i64) -> AppResult<Option<String>> {
    let chapter = app
        .db
        .get_chapter(chapter_id)
        .await?
        .filter(|c| c.novel_id == novel_id)
        .ok_or_else(chapter_not_found)?;
    Ok(chapter.content.filter(|c| !c.trim().is_empty()))
}

async fn run(
    app: &AppState,
    settings: &ProviderSettings,
    instruction: String,
    context: GenerationContext,
    max_tokens: u32,
) -> AppResult<Json<AiGenerateResponse>> {
    let request = settings.request(instruction, context, max_tokens);
    let result = app.ai.generate(request).await.inspect_err(|e| {
        warn!(provider = %e.provider, error = %e.message, "generation failed");
    })?;
    info!(
        provider = %settings.provider,
        model = %result.model,
        tokens = result.tokens_used,
        "generated content"
    );
    Ok(Json(result.into()))
}

/// POST /api/ai/generate
///
/// `context_type` picks which sections accompany the prompt; a `chapter_id`
/// adds that chapter's text as prior content.
async fn generate(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AiGenerateRequest>,
) -> AppResult<Json<AiGenerateResponse>> {
    payload.validate()?;
    let options = ContextOptions::for_context_type(&payload.context_type);
    let mut context = build_context(&app.db, &payload.novel_id, options).await?;
    if let Some(chapter_id) = payload.chapter_id {
        context.previous_content = chapter_text(&app, &payload.novel_id, chapter_id).await?;
    }
    run(&app, &payload.settings, payload.prompt, context, payload.max_tokens).await
}

/// POST /api/ai/generate-character
async fn generate_character(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CharacterGenerateRequest>,
) -> AppResult<Json<AiGenerateResponse>> {
    payload.validate()?;
    let options = ContextOptions {
        characters: true,
        world: true,
        ..Default::default()
    };
    let context = build_context(&app.db, &payload.novel_id, options).await?;
    let instruction =
        character_instruction(payload.character_role, payload.character_traits.as_deref());
    run(&app, &payload.settings, instruction, context, payload.max_tokens).await
}

/// POST /api/ai/generate-plot
async fn generate_plot(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PlotGenerateRequest>,
) -> AppResult<Json<AiGenerateResponse>> {
    payload.validate()?;
    let context = build_context(&app.db, &payload.novel_id, ContextOptions::all()).await?;
    let instruction = plot_instruction(payload.plot_type, payload.plot_length);
    run(&app, &payload.settings, instruction, context, payload.max_tokens).await
}

/// POST /api/ai/generate-chapter-outline
///
/// Summaries of the earlier chapters become prior content.
async fn generate_chapter_outline(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ChapterOutlineRequest>,
) -> AppResult<Json<AiGenerateResponse>> {
    payload.validate()?;
    let mut context = build_context(&app.db, &payload.novel_id, ContextOptions::all()).await?;

    let earlier = app
        .db
        .chapters_before(&payload.novel_id, payload.chapter_number)
        .await?;
    context.previous_content = summarize_previous_chapters(
        earlier
            .iter()
            .map(|c| (c.chapter_number, c.title.as_deref(), c.summary.as_deref())),
    );

    let instruction =
        chapter_outline_instruction(payload.chapter_number, payload.chapter_theme.as_deref());
    run(&app, &payload.settings, instruction, context, payload.max_tokens).await
}

/// POST /api/ai/expand-content
async fn expand_content(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ExpandContentRequest>,
) -> AppResult<Json<AiGenerateResponse>> {
    payload.validate()?;
    let options = ContextOptions {
        characters: true,
        world: true,
        ..Default::default()
    };
    let mut context = build_context(&app.db, &payload.novel_id, options).await?;
    if let Some(chapter_id) = payload.chapter_id {
        context.previous_content = chapter_text(&app, &payload.novel_id, chapter_id).await?;
    }
    let instruction = expand_instruction(&payload.content_snippet, payload.expansion_style);
    run(&app, &payload.settings, instruction, context, payload.max_tokens).await
}

/// POST /api/ai/generate-world
async fn generate_world(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<WorldGenerateRequest>,
) -> AppResult<Json<AiGenerateResponse>> {
    payload.validate()?;
    let options = ContextOptions {
        world: true,
        ..Default::default()
    };
    let context = build_context(&app.db, &payload.novel_id, options).await?;
    run(
        &app,
        &payload.settings,
        world_instruction(payload.focus),
        context,
        payload.max_tokens,
    )
    .await
}

/// POST /api/ai/test-config
///
/// Always 200; the outcome is reported in the body.
async fn test_config(
    State(app): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AiTestRequest>,
) -> AppResult<Json<AiTestResponse>> {
    if payload.provider.trim().is_empty() {
        return Ok(Json(AiTestResponse {
            ok: false,
            provider: payload.provider,
            message: "provider must not be empty".to_string(),
        }));
    }

    let outcome = app
        .ai
        .test_connection(
            &payload.provider,
            payload.model(),
            payload.api_key.as_deref(),
            payload.base_url.as_deref(),
        )
        .await;

    Ok(Json(match outcome {
        Ok(result) => AiTestResponse {
            ok: true,
            provider: payload.provider,
            message: format!("Connection successful (model {})", result.model),
        },
        Err(e) => {
            warn!(provider = %payload.provider, error = %e, "provider configuration test failed");
            AiTestResponse {
                ok: false,
                provider: payload.provider,
                message: e.to_string(),
            }
        }
    }))
}
