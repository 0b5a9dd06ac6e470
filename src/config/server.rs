// src/config/server.rs
// Server, database, logging and rate limit configuration

use super::helpers::{env_bool, env_opt, env_or, env_parse, split_list};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub app_name: String,
    /// Development mode. Enables the LLM mock path and verbose logging.
    pub debug: bool,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            app_name: "AI Novel Platform".to_string(),
            debug: false,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            host: env_or("HOST", &d.host),
            port: env_parse("PORT", d.port),
            app_name: env_or("APP_NAME", &d.app_name),
            debug: env_bool("DEBUG", d.debug),
            allowed_origins: env_opt("ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(d.allowed_origins),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://storyloom.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            url: env_or("DATABASE_URL", &d.url),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", d.max_connections),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Explicit level; when unset the level follows `ServerConfig::debug`.
    pub level: Option<String>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: env_opt("LOG_LEVEL"),
        }
    }

    pub fn tracing_level(&self, debug: bool) -> tracing::Level {
        let fallback = if debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        self.level
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(fallback)
    }
}

/// Per-client rate limiting for the AI endpoints
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            enabled: env_bool("RATE_LIMIT_ENABLED", d.enabled),
            requests_per_minute: env_parse("RATE_LIMIT_REQUESTS_PER_MINUTE", d.requests_per_minute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_tracing_level_follows_debug_when_unset() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.tracing_level(true), tracing::Level::DEBUG);
        assert_eq!(logging.tracing_level(false), tracing::Level::INFO);

        let explicit = LoggingConfig {
            level: Some("warn".into()),
        };
        assert_eq!(explicit.tracing_level(true), tracing::Level::WARN);
    }
}
