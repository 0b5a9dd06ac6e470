// src/state.rs
// Shared application state handed to every route

use anyhow::Result;
use std::sync::Arc;

use crate::api::rate_limit::ClientRateLimiter;
use crate::cache::CacheHandle;
use crate::config::AppConfig;
use crate::db::Database;
use crate::llm::AiService;

pub struct AppState {
    // -------- Storage --------
    pub db: Database,

    // -------- Configuration --------
    pub config: Arc<AppConfig>,

    // -------- AI --------
    pub ai: Arc<AiService>,

    // -------- Request guards --------
    pub rate_limiter: Option<Arc<ClientRateLimiter>>,
}

impl AppState {
    /// Assemble the state from configuration. The cache backend and the
    /// provider HTTP client are built here once and shared by all requests.
    pub fn new(config: AppConfig, db: Database) -> Result<Self> {
        let cache = CacheHandle::from_config(&config.llm.cache, &db);
        let ai = AiService::new(&config.llm, config.server.debug, cache);
        Self::with_ai(config, db, ai)
    }

    /// Like [`AppState::new`] with a preassembled AI service.
    pub fn with_ai(config: AppConfig, db: Database, ai: AiService) -> Result<Self> {
        let rate_limiter = if config.rate_limit.enabled {
            Some(Arc::new(ClientRateLimiter::new(
                config.rate_limit.requests_per_minute,
            )?))
        } else {
            None
        };

        Ok(Self {
            db,
            config: Arc::new(config),
            ai: Arc::new(ai),
            rate_limiter,
        })
    }
}
