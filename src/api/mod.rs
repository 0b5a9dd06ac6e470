// src/api/mod.rs
// HTTP surface: one router per resource, merged with the shared layers

pub mod admin;
pub mod ai;
pub mod ai_assistants;
pub mod auth;
pub mod chapter_versions;
pub mod chapters;
pub mod characters;
pub mod health;
pub mod json;
pub mod novels;
pub mod plots;
pub mod prompts;
pub mod rate_limit;
pub mod users;
pub mod worlds;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::state::AppState;

pub use json::ApiJson;

/// Build the application router. Trailing-slash normalization wraps this
/// router at serve time, since it must run before routing.
pub fn router(state: Arc<AppState>) -> Router {
    let ai_routes = Router::new()
        .nest("/api/ai", ai::routes())
        .nest("/api/ai-assistants", ai_assistants::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_by_client,
        ));

    Router::new()
        .merge(health::routes())
        .nest("/api/novels", novels::routes())
        .nest("/api/characters", characters::routes())
        .nest("/api/plots", plots::routes())
        .nest("/api/worlds", worlds::routes())
        .nest("/api/chapters", chapters::routes())
        .nest("/api/chapter-versions", chapter_versions::routes())
        .nest("/api/admin", admin::routes())
        .nest("/auth", auth::routes())
        .nest("/users", users::routes())
        .nest("/prompts", prompts::routes())
        .merge(ai_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors_layer(&state.config.server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
