// src/llm/http_client.rs
// Shared HTTP client for all LLM providers. One attempt per call, no retries.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

use super::provider::ProviderError;

/// Connect timeout applied on top of the configured request timeout
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Provider error bodies are truncated to this many characters
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Clone, Debug)]
pub struct LlmHttpClient {
    client: Client,
    pub request_timeout: Duration,
}

impl LlmHttpClient {
    pub fn new(request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS).min(request_timeout))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            request_timeout,
        }
    }

    /// Send one request built by `build_request` and return the body text.
    ///
    /// Transport failures and non-2xx statuses become a [`ProviderError`]
    /// for `provider`.
    pub async fn execute<F>(&self, provider: &str, build_request: F) -> Result<String, ProviderError>
    where
        F: FnOnce(&Client) -> RequestBuilder,
    {
        let response = build_request(&self.client).send().await.map_err(|e| {
            let cause = if e.is_timeout() {
                format!("request timed out after {:?}", self.request_timeout)
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            ProviderError::new(provider, cause)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::new(provider, format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::new(
                provider,
                format!("HTTP {}: {}", status.as_u16(), truncate(&body)),
            ));
        }

        debug!(provider, status = %status, bytes = body.len(), "provider responded");
        Ok(body)
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", cut)
    }
}
