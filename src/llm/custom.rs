// src/llm/custom.rs
// Arbitrary OpenAI-protocol-compatible endpoint with a one-shot style fallback

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::http_client::LlmHttpClient;
use super::openai_compat::{
    ChatRequest, CompletionRequest, EndpointStyle, alternate_endpoint, extract_content,
    extract_usage, normalize_endpoint,
};
use super::provider::{CompletionParams, GenerationResult, LlmClient, ProviderError};

pub struct CustomClient {
    http: LlmHttpClient,
    name: String,
    endpoint: String,
    style: EndpointStyle,
    api_key: Option<String>,
}

impl CustomClient {
    pub fn new(http: LlmHttpClient, name: &str, base_url: &str, api_key: Option<String>) -> Self {
        let (endpoint, style) = normalize_endpoint(base_url);
        Self {
            http,
            name: name.to_string(),
            endpoint,
            style,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn endpoint(&self) -> (&str, EndpointStyle) {
        (&self.endpoint, self.style)
    }

    /// One POST in the given style. `Ok(None)` means the endpoint answered
    /// but no content could be found in the body.
    async fn call(
        &self,
        url: &str,
        style: EndpointStyle,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<Option<(String, u64)>, ProviderError> {
        let body = match style {
            EndpointStyle::Chat => serde_json::to_value(
                ChatRequest::user(&params.model, prompt, params.max_tokens)
                    .with_temperature(params.temperature),
            ),
            EndpointStyle::Completion => serde_json::to_value(CompletionRequest {
                model: &params.model,
                prompt,
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            }),
        }
        .map_err(|e| self.error(format!("failed to encode request: {}", e)))?;

        debug!(url = %url, ?style, "calling custom endpoint");
        let text = self
            .http
            .execute(&self.name, |client| {
                let request = client.post(url).json(&body);
                match &self.api_key {
                    Some(key) => request.bearer_auth(key),
                    None => request,
                }
            })
            .await?;

        let response: Value = serde_json::from_str(&text)
            .map_err(|e| self.error(format!("malformed response: {}", e)))?;
        Ok(extract_content(&response).map(|content| (content, extract_usage(&response))))
    }
}

#[async_trait]
impl LlmClient for CustomClient {
    fn provider_name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, prompt), fields(provider = %self.name, model = %params.model))]
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<GenerationResult, ProviderError> {
        let mut found = self.call(&self.endpoint, self.style, prompt, params).await?;

        if found.is_none() {
            let (url, style) = alternate_endpoint(&self.endpoint, self.style);
            info!(url = %url, ?style, "no content in response, retrying with the other completion style");
            found = self.call(&url, style, prompt, params).await?;
        }

        let (content, tokens_used) =
            found.ok_or_else(|| self.error("no content in response from either completion style"))?;

        Ok(GenerationResult {
            content,
            tokens_used,
            model: params.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_endpoint_resolution_and_blank_key() {
        let http = LlmHttpClient::new(Duration::from_secs(5));
        let client = CustomClient::new(http, "custom", "http://llm.local:8080", Some(String::new()));
        assert_eq!(
            client.endpoint(),
            ("http://llm.local:8080/v1/chat/completions", EndpointStyle::Chat)
        );
        assert!(client.api_key.is_none());
    }
}
