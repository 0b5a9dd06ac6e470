// src/config/llm.rs
// Provider credentials, request timeout and response cache settings

use super::helpers::{env_opt, env_or, env_parse};
use std::str::FromStr;

/// Environment-configured provider defaults. Request payloads take precedence.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub custom_api_url: Option<String>,
    pub custom_api_key: Option<String>,
    pub ollama_host: String,
    pub request_timeout_secs: u64,
    pub cache: CacheConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            custom_api_url: None,
            custom_api_key: None,
            ollama_host: "http://localhost:11434".to_string(),
            request_timeout_secs: 60,
            cache: CacheConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            openai_api_key: env_opt("OPENAI_API_KEY"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            custom_api_url: env_opt("CUSTOM_API_URL"),
            custom_api_key: env_opt("CUSTOM_API_KEY"),
            ollama_host: env_or("OLLAMA_HOST", &d.ollama_host),
            request_timeout_secs: env_parse("AI_REQUEST_TIMEOUT_SECS", d.request_timeout_secs),
            cache: CacheConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    None,
    Memory,
    Sqlite,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Ok(Self::None),
            "memory" => Ok(Self::Memory),
            "sqlite" | "database" => Ok(Self::Sqlite),
            other => Err(format!("unknown cache backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub ttl_secs: u64,
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::None,
            ttl_secs: 3600,
            capacity: 1000,
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let backend = env_or("AI_CACHE_BACKEND", "none")
            .parse()
            .unwrap_or_else(|e: String| {
                tracing::warn!("{}, response cache disabled", e);
                CacheBackend::None
            });
        Self {
            backend,
            ttl_secs: env_parse("AI_CACHE_TTL_SECS", d.ttl_secs),
            capacity: env_parse("AI_CACHE_CAPACITY", d.capacity),
        }
    }
}
