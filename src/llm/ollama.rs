// src/llm/ollama.rs
// Ollama local runner client (native /api/generate endpoint, no auth)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::http_client::LlmHttpClient;
use super::provider::{CompletionParams, GenerationResult, LlmClient, ProviderError};

/// Normalize Ollama base URL by stripping trailing slashes and /v1 suffix
fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim_end_matches('/').to_string();
    if url.ends_with("/v1") {
        url.truncate(url.len() - 3);
    }
    url
}

/// Check if a URL points to a local address (localhost, 127.0.0.1, [::1])
fn is_local_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host() {
            Some(url::Host::Domain(d)) => d == "localhost",
            Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
            Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
            None => true,
        },
        Err(_) => true,
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

pub struct OllamaClient {
    http: LlmHttpClient,
    base_url: String,
}

impl OllamaClient {
    pub fn new(http: LlmHttpClient, base_url: &str) -> Self {
        let base_url = normalize_base_url(base_url);
        if !is_local_url(&base_url) {
            warn!(
                "Ollama host '{}' is not local; prompts will leave this machine",
                base_url
            );
        }
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, prompt), fields(model = %params.model))]
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<GenerationResult, ProviderError> {
        let body = GenerateRequest {
            model: &params.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: params.max_tokens,
                temperature: params.temperature,
            },
        };
        let url = self.endpoint();

        let text = self
            .http
            .execute(self.provider_name(), |client| client.post(&url).json(&body))
            .await?;

        let response: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| self.error(format!("malformed response: {}", e)))?;
        if response.response.is_empty() {
            return Err(self.error("response contained no content"));
        }

        Ok(GenerationResult {
            content: response.response,
            tokens_used: response.prompt_eval_count + response.eval_count,
            model: params.model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
        assert_eq!(normalize_base_url("http://localhost:11434/v1"), "http://localhost:11434");
    }

    #[test]
    fn test_is_local_url() {
        assert!(is_local_url("http://localhost:11434"));
        assert!(is_local_url("http://127.0.0.1:11434"));
        assert!(is_local_url("http://[::1]:11434"));
        assert!(!is_local_url("http://gpu-box.internal:11434"));
    }
}
