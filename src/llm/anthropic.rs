// src/llm/anthropic.rs
// Anthropic Messages API client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::http_client::LlmHttpClient;
use super::openai_compat::ChatMessage;
use super::provider::{CompletionParams, GenerationResult, LlmClient, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

pub struct AnthropicClient {
    http: LlmHttpClient,
    base_url: String,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(http: LlmHttpClient, api_key: String, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut base = base.trim_end_matches('/').to_string();
        // Accept bases given with or without the version segment
        if base.ends_with("/v1") {
            base.truncate(base.len() - 3);
        }
        Self {
            http,
            base_url: base,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, prompt), fields(model = %params.model))]
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<GenerationResult, ProviderError> {
        let body = MessagesRequest {
            model: &params.model,
            max_tokens: params.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
        };
        let url = self.endpoint();
        debug!(url = %url, "calling Anthropic");

        let text = self
            .http
            .execute(self.provider_name(), |client| {
                client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", API_VERSION)
                    .json(&body)
            })
            .await?;

        let response: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| self.error(format!("malformed response: {}", e)))?;

        let content = response
            .content
            .into_iter()
            .find(|block| block.block_type == "text" || block.block_type.is_empty())
            .and_then(|block| block.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| self.error("response contained no text block"))?;
        let usage = response.usage.unwrap_or_default();

        Ok(GenerationResult {
            content,
            tokens_used: usage.input_tokens + usage.output_tokens,
            model: params.model.clone(),
        })
    }
}
