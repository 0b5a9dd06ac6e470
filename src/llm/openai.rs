// src/llm/openai.rs
// OpenAI chat completions client

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::http_client::LlmHttpClient;
use super::openai_compat::{ChatRequest, extract_content, extract_usage};
use super::provider::{CompletionParams, GenerationResult, LlmClient, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    http: LlmHttpClient,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(http: LlmHttpClient, api_key: String, base_url: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, prompt), fields(model = %params.model))]
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<GenerationResult, ProviderError> {
        let body = ChatRequest::user(&params.model, prompt, params.max_tokens)
            .with_temperature(params.temperature);
        let url = self.endpoint();
        debug!(url = %url, "calling OpenAI");

        let text = self
            .http
            .execute(self.provider_name(), |client| {
                client.post(&url).bearer_auth(&self.api_key).json(&body)
            })
            .await?;

        let response: Value = serde_json::from_str(&text)
            .map_err(|e| self.error(format!("malformed response: {}", e)))?;
        let content = extract_content(&response)
            .ok_or_else(|| self.error("response contained no content"))?;

        Ok(GenerationResult {
            content,
            tokens_used: extract_usage(&response),
            model: params.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoint_defaults_and_trims() {
        let http = LlmHttpClient::new(Duration::from_secs(5));
        let client = OpenAiClient::new(http.clone(), "sk-test".into(), None);
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");

        let proxied = OpenAiClient::new(http, "sk-test".into(), Some("http://proxy/v1/".into()));
        assert_eq!(proxied.endpoint(), "http://proxy/v1/chat/completions");
    }
}
