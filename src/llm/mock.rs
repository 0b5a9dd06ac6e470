// src/llm/mock.rs
// Deterministic offline responses for development without credentials

use super::provider::{GenerationResult, ProviderKind};

/// Keys starting with this (case-insensitive) are template placeholders,
/// e.g. `your-openai-api-key`.
pub const PLACEHOLDER_KEY_PREFIX: &str = "your";

const ECHO_CHARS: usize = 80;

pub fn is_placeholder_key(key: Option<&str>) -> bool {
    match key.map(str::trim) {
        None | Some("") => true,
        Some(k) => k
            .get(..PLACEHOLDER_KEY_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(PLACEHOLDER_KEY_PREFIX)),
    }
}

/// Whether a call should be answered by [`mock_response`] instead of the network.
///
/// Only in debug mode, and only when the provider could not possibly be
/// reached: a missing/placeholder key for OpenAI or Anthropic, or a custom
/// provider without a base URL. Ollama needs neither and is never mocked.
pub fn should_mock(
    debug: bool,
    kind: &ProviderKind,
    api_key: Option<&str>,
    base_url: Option<&str>,
) -> bool {
    if !debug {
        return false;
    }
    match kind {
        ProviderKind::OpenAi | ProviderKind::Anthropic => is_placeholder_key(api_key),
        ProviderKind::Custom(_) => base_url.is_none_or(|u| u.trim().is_empty()),
        ProviderKind::Ollama => false,
    }
}

pub fn mock_response(kind: &ProviderKind, model: &str, instruction: &str) -> GenerationResult {
    let instruction = instruction.trim();
    let mut echo: String = instruction.chars().take(ECHO_CHARS).collect();
    if instruction.chars().count() > ECHO_CHARS {
        echo.push_str("...");
    }

    GenerationResult {
        content: format!("[mock:{}/{}] {}", kind.name(), model, echo),
        tokens_used: 0,
        model: model.to_string(),
    }
}
