// src/llm/service.rs
// Generation service: resolve credentials, mock or cache, then dispatch

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheHandle, cache_key};
use crate::config::LlmConfig;
use crate::prompt::{GenerationContext, render_prompt};

use super::anthropic::AnthropicClient;
use super::custom::CustomClient;
use super::http_client::LlmHttpClient;
use super::mock::{mock_response, should_mock};
use super::ollama::OllamaClient;
use super::openai::OpenAiClient;
use super::provider::{CompletionParams, GenerationResult, LlmClient, ProviderError, ProviderKind};

const CONNECTION_TEST_PROMPT: &str = "Reply with the single word OK.";
const CONNECTION_TEST_MAX_TOKENS: u32 = 16;

/// One generation call as issued by a route handler or assistant.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub provider: String,
    pub model_name: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub prompt: String,
    pub context: GenerationContext,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// Provider, key and base URL after falling back to configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedTarget {
    kind: ProviderKind,
    api_key: Option<String>,
    base_url: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub struct AiService {
    http: LlmHttpClient,
    config: LlmConfig,
    debug: bool,
    cache: CacheHandle,
}

impl AiService {
    pub fn new(config: &LlmConfig, debug: bool, cache: CacheHandle) -> Self {
        let http = LlmHttpClient::new(Duration::from_secs(config.request_timeout_secs));
        let mock_fallback = debug;
        info!(
            timeout_secs = config.request_timeout_secs,
            cache = cache.is_enabled(),
            mock_fallback,
            "AI service initialized"
        );
        Self {
            http,
            config: config.clone(),
            debug,
            cache,
        }
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    fn resolve(
        &self,
        provider: &str,
        api_key: Option<&str>,
        base_url: Option<&str>,
    ) -> ResolvedTarget {
        let kind = ProviderKind::parse(provider);
        let configured_key = match &kind {
            ProviderKind::OpenAi => self.config.openai_api_key.as_deref(),
            ProviderKind::Anthropic => self.config.anthropic_api_key.as_deref(),
            ProviderKind::Custom(_) => self.config.custom_api_key.as_deref(),
            ProviderKind::Ollama => None,
        };
        let configured_url = match &kind {
            ProviderKind::Custom(_) => self.config.custom_api_url.as_deref(),
            ProviderKind::Ollama => Some(self.config.ollama_host.as_str()),
            ProviderKind::OpenAi | ProviderKind::Anthropic => None,
        };

        ResolvedTarget {
            api_key: non_empty(api_key).or_else(|| non_empty(configured_key)),
            base_url: non_empty(base_url).or_else(|| non_empty(configured_url)),
            kind,
        }
    }

    /// Build the client for a resolved target. Missing credentials fail here,
    /// before any network traffic.
    fn client_for(&self, target: &ResolvedTarget) -> Result<Box<dyn LlmClient>, ProviderError> {
        let http = self.http.clone();
        let missing_key = |env: &str| {
            ProviderError::new(
                target.kind.name(),
                format!("missing API key; pass api_key or set {}", env),
            )
        };

        Ok(match &target.kind {
            ProviderKind::OpenAi => {
                let key = target.api_key.clone().ok_or_else(|| missing_key("OPENAI_API_KEY"))?;
                Box::new(OpenAiClient::new(http, key, target.base_url.clone()))
            }
            ProviderKind::Anthropic => {
                let key = target
                    .api_key
                    .clone()
                    .ok_or_else(|| missing_key("ANTHROPIC_API_KEY"))?;
                Box::new(AnthropicClient::new(http, key, target.base_url.clone()))
            }
            ProviderKind::Ollama => {
                let base_url = target.base_url.as_deref().unwrap_or(&self.config.ollama_host);
                Box::new(OllamaClient::new(http, base_url))
            }
            ProviderKind::Custom(name) => {
                let base_url = target.base_url.as_deref().ok_or_else(|| {
                    ProviderError::new(name.as_str(), "custom provider requires base_url")
                })?;
                Box::new(CustomClient::new(http, name, base_url, target.api_key.clone()))
            }
        })
    }

    /// Render the prompt and produce a completion.
    ///
    /// In debug mode an unreachable provider answers with a deterministic
    /// mock. Otherwise the cache is consulted, the provider is called and a
    /// successful result is cached.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let target = self.resolve(
            &request.provider,
            request.api_key.as_deref(),
            request.base_url.as_deref(),
        );

        if should_mock(
            self.debug,
            &target.kind,
            target.api_key.as_deref(),
            target.base_url.as_deref(),
        ) {
            warn!(provider = %target.kind, model = %request.model_name, "no usable credentials, returning mock response");
            return Ok(mock_response(&target.kind, &request.model_name, &request.prompt));
        }

        let full_prompt = render_prompt(&request.context, &request.prompt);
        let key = cache_key(target.kind.name(), &request.model_name, &full_prompt);
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let client = self.client_for(&target)?;
        let params = CompletionParams {
            model: request.model_name.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        debug!(
            provider = %target.kind,
            model = %params.model,
            key = &key[..8],
            prompt_chars = full_prompt.len(),
            "dispatching generation"
        );

        let mut result = client.complete(&full_prompt, &params).await?;
        result.model = request.model_name;
        debug!(provider = %target.kind, tokens = result.tokens_used, "generation complete");

        self.cache.put(&key, &result).await;
        Ok(result)
    }

    /// Issue a minimal completion to check that a provider configuration
    /// works. Bypasses the cache.
    pub async fn test_connection(
        &self,
        provider: &str,
        model_name: &str,
        api_key: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<GenerationResult, ProviderError> {
        let target = self.resolve(provider, api_key, base_url);
        if should_mock(
            self.debug,
            &target.kind,
            target.api_key.as_deref(),
            target.base_url.as_deref(),
        ) {
            return Ok(mock_response(&target.kind, model_name, CONNECTION_TEST_PROMPT));
        }

        let client = self.client_for(&target)?;
        let params = CompletionParams {
            model: model_name.to_string(),
            max_tokens: CONNECTION_TEST_MAX_TOKENS,
            temperature: None,
        };
        client.complete(CONNECTION_TEST_PROMPT, &params).await
    }
}
