// src/llm/provider.rs
// Provider identity, the per-call error type and the client trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// LLM backend selected by the request's `provider` string.
///
/// The set is open: any unrecognised name is treated as an
/// OpenAI-protocol-compatible custom endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
    Custom(String),
}

impl ProviderKind {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "anthropic" | "claude" => Self::Anthropic,
            "ollama" | "local" => Self::Ollama,
            "" => Self::Custom("custom".to_string()),
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any failure of a generation call. The message always names the provider.
#[derive(Debug, Error)]
#[error("{provider} API error: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Uniform generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub tokens_used: u64,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// One configured backend able to complete a rendered prompt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Complete `prompt`. Implementations return content and token usage;
    /// `model` echoes the requested model.
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<GenerationResult, ProviderError>;

    fn error(&self, message: impl Into<String>) -> ProviderError
    where
        Self: Sized,
    {
        ProviderError::new(self.provider_name(), message)
    }
}
