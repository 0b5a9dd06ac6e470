// src/llm/openai_compat.rs
// OpenAI-protocol request bodies and lenient response parsing, shared by
// the OpenAI client and custom endpoints

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// `/chat/completions` request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl<'a> ChatRequest<'a> {
    pub fn user(model: &'a str, prompt: &'a str, max_tokens: u32) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Legacy `/completions` request body
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Which completion protocol an endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStyle {
    Chat,
    Completion,
}

const CHAT_SUFFIX: &str = "/chat/completions";
const COMPLETION_SUFFIX: &str = "/completions";

/// Resolve a custom base URL into a full endpoint and its style.
///
/// URLs already ending in a completions path are used verbatim; anything
/// else gets `/v1/chat/completions` appended.
pub fn normalize_endpoint(base_url: &str) -> (String, EndpointStyle) {
    let trimmed = base_url.trim();
    if trimmed.ends_with(CHAT_SUFFIX) {
        (trimmed.to_string(), EndpointStyle::Chat)
    } else if trimmed.ends_with(COMPLETION_SUFFIX) {
        (trimmed.to_string(), EndpointStyle::Completion)
    } else {
        (
            format!("{}/v1{}", trimmed.trim_end_matches('/'), CHAT_SUFFIX),
            EndpointStyle::Chat,
        )
    }
}

/// The same endpoint in the other completion style.
pub fn alternate_endpoint(url: &str, style: EndpointStyle) -> (String, EndpointStyle) {
    match style {
        EndpointStyle::Chat => {
            let base = url.strip_suffix(CHAT_SUFFIX).unwrap_or(url);
            (format!("{}{}", base, COMPLETION_SUFFIX), EndpointStyle::Completion)
        }
        EndpointStyle::Completion => {
            let base = url.strip_suffix(COMPLETION_SUFFIX).unwrap_or(url);
            (format!("{}{}", base, CHAT_SUFFIX), EndpointStyle::Chat)
        }
    }
}

/// Pull generated text out of an OpenAI-shaped response.
///
/// Looks at `choices[0].message.content` (a string or a list of text
/// blocks) and then `choices[0].text`. Empty text counts as missing.
pub fn extract_content(response: &Value) -> Option<String> {
    let choice = response.get("choices")?.get(0)?;

    let from_message = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(content_text);
    if from_message.is_some() {
        return from_message;
    }

    choice
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(blocks) => {
            let joined: String = blocks
                .iter()
                .filter_map(|block| match block {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(_) => block.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect();
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

/// `usage.total_tokens`, else `prompt_tokens + completion_tokens`, else 0.
pub fn extract_usage(response: &Value) -> u64 {
    let Some(usage) = response.get("usage") else {
        return 0;
    };
    if let Some(total) = usage.get("total_tokens").and_then(Value::as_u64) {
        return total;
    }
    let prompt = usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0);
    let completion = usage
        .get("completion_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    prompt + completion
}
