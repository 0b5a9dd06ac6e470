// src/config/mod.rs
// Application configuration, composed from per-domain structs.
//
// Built once at startup and passed into `AppState`; nothing reads the
// environment after that.

pub mod auth;
pub mod helpers;
pub mod llm;
pub mod server;

pub use auth::AuthConfig;
pub use llm::{CacheBackend, CacheConfig, LlmConfig};
pub use server::{DatabaseConfig, LoggingConfig, RateLimitConfig, ServerConfig};

use anyhow::bail;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load `.env` (if present) and read every domain config.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            logging: LoggingConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            auth: AuthConfig::from_env(),
            llm: LlmConfig::from_env(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.server.debug && self.auth.uses_dev_secret() {
            bail!("SECRET_KEY must be set when DEBUG is off");
        }
        if self.rate_limit.enabled && self.rate_limit.requests_per_minute == 0 {
            bail!("RATE_LIMIT_REQUESTS_PER_MINUTE must be greater than zero");
        }
        if self.llm.request_timeout_secs == 0 {
            bail!("AI_REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}
