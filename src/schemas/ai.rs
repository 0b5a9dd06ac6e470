// src/schemas/ai.rs
// Payloads for the AI generation and assistant endpoints

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Validate, max_len, opt_max_len, require_text};
use crate::error::{AppError, AppResult};
use crate::llm::{GenerationRequest, GenerationResult};
use crate::prompt::GenerationContext;
use crate::prompt::templates::{
    CharacterArchetype, ExpansionStyle, PlotKind, PlotLength, WorldFocus,
};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const MAX_GENERATION_TOKENS: u32 = 8000;
pub const DEFAULT_ASSISTANT_TEMPERATURE: f32 = 0.7;
pub const ASSISTANT_TOKEN_RANGE: std::ops::RangeInclusive<u32> = 100..=4000;
pub const DEFAULT_VERSION_COUNT: u32 = 2;
pub const MAX_VERSION_COUNT: u32 = 5;

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_context_type() -> String {
    "general".to_string()
}

/// Provider selection shared by every AI payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model_name: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model_name: default_model(),
            base_url: None,
            api_key: None,
            temperature: None,
        }
    }
}

impl Validate for ProviderSettings {
    fn validate(&self) -> AppResult<()> {
        require_text("provider", &self.provider, 50)?;
        require_text("model_name", &self.model_name, 100)?;
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Url::parse(url.trim())
                .map_err(|e| AppError::validation(format!("base_url is not a valid URL: {}", e)))?;
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(AppError::validation("temperature must be between 0 and 2"));
        }
        Ok(())
    }
}

impl ProviderSettings {
    pub fn request(
        &self,
        prompt: String,
        context: GenerationContext,
        max_tokens: u32,
    ) -> GenerationRequest {
        GenerationRequest {
            provider: self.provider.clone(),
            model_name: self.model_name.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            prompt,
            context,
            max_tokens,
            temperature: self.temperature,
        }
    }
}

fn check_max_tokens(max_tokens: u32) -> AppResult<()> {
    if !(1..=MAX_GENERATION_TOKENS).contains(&max_tokens) {
        return Err(AppError::validation(format!(
            "max_tokens must be between 1 and {}",
            MAX_GENERATION_TOKENS
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct AiGenerateRequest {
    pub novel_id: String,
    pub chapter_id: Option<i64>,
    pub prompt: String,
    #[serde(default = "default_context_type")]
    pub context_type: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for AiGenerateRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("novel_id", &self.novel_id, 64)?;
        require_text("prompt", &self.prompt, 20_000)?;
        max_len("context_type", &self.context_type, 50)?;
        check_max_tokens(self.max_tokens)?;
        self.settings.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct CharacterGenerateRequest {
    pub novel_id: String,
    pub character_role: CharacterArchetype,
    pub character_traits: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for CharacterGenerateRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("novel_id", &self.novel_id, 64)?;
        opt_max_len("character_traits", self.character_traits.as_deref(), 1000)?;
        check_max_tokens(self.max_tokens)?;
        self.settings.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct PlotGenerateRequest {
    pub novel_id: String,
    #[serde(default)]
    pub plot_type: PlotKind,
    #[serde(default)]
    pub plot_length: PlotLength,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for PlotGenerateRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("novel_id", &self.novel_id, 64)?;
        check_max_tokens(self.max_tokens)?;
        self.settings.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChapterOutlineRequest {
    pub novel_id: String,
    pub chapter_number: i64,
    pub chapter_theme: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for ChapterOutlineRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("novel_id", &self.novel_id, 64)?;
        if self.chapter_number < 1 {
            return Err(AppError::validation("chapter_number must be >= 1"));
        }
        opt_max_len("chapter_theme", self.chapter_theme.as_deref(), 1000)?;
        check_max_tokens(self.max_tokens)?;
        self.settings.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpandContentRequest {
    pub novel_id: String,
    pub chapter_id: Option<i64>,
    pub content_snippet: String,
    #[serde(default)]
    pub expansion_style: ExpansionStyle,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for ExpandContentRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("novel_id", &self.novel_id, 64)?;
        require_text("content_snippet", &self.content_snippet, 20_000)?;
        check_max_tokens(self.max_tokens)?;
        self.settings.validate()
    }
}

#[derive(Debug, Deserialize)]
pub struct WorldGenerateRequest {
    pub novel_id: String,
    #[serde(default)]
    pub focus: WorldFocus,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for WorldGenerateRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("novel_id", &self.novel_id, 64)?;
        check_max_tokens(self.max_tokens)?;
        self.settings.validate()
    }
}

#[derive(Debug, Serialize)]
pub struct AiGenerateResponse {
    pub content: String,
    pub tokens_used: u64,
    pub model: String,
}

impl From<GenerationResult> for AiGenerateResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            content: result.content,
            tokens_used: result.tokens_used,
            model: result.model,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AiTestRequest {
    pub provider: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
}

impl AiTestRequest {
    pub fn model(&self) -> &str {
        self.model_name
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }
}

#[derive(Debug, Serialize)]
pub struct AiTestResponse {
    pub ok: bool,
    pub provider: String,
    pub message: String,
}

// ============================================================================
// Assistants
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub role: String,
    pub novel_id: String,
    pub user_input: String,
    /// Falls back to the persona's own budget
    pub max_tokens: Option<u32>,
    #[serde(flatten)]
    pub settings: ProviderSettings,
}

impl Validate for AssistantRequest {
    fn validate(&self) -> AppResult<()> {
        require_text("role", &self.role, 50)?;
        require_text("novel_id", &self.novel_id, 64)?;
        require_text("user_input", &self.user_input, 20_000)?;
        if let Some(max_tokens) = self.max_tokens
            && !ASSISTANT_TOKEN_RANGE.contains(&max_tokens)
        {
            return Err(AppError::validation(format!(
                "max_tokens must be between {} and {}",
                ASSISTANT_TOKEN_RANGE.start(),
                ASSISTANT_TOKEN_RANGE.end()
            )));
        }
        self.settings.validate()
    }
}

impl AssistantRequest {
    /// Provider settings with the assistant temperature default applied.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            temperature: Some(self.settings.temperature.unwrap_or(DEFAULT_ASSISTANT_TEMPERATURE)),
            ..self.settings.clone()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MultiVersionQuery {
    pub num_versions: Option<u32>,
}

impl MultiVersionQuery {
    pub fn count(&self) -> AppResult<usize> {
        let n = self.num_versions.unwrap_or(DEFAULT_VERSION_COUNT);
        if !(1..=MAX_VERSION_COUNT).contains(&n) {
            return Err(AppError::validation(format!(
                "num_versions must be between 1 and {}",
                MAX_VERSION_COUNT
            )));
        }
        Ok(n as usize)
    }
}

#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub role: String,
    pub content: String,
    pub tokens_used: u64,
}

#[derive(Debug, Serialize)]
pub struct MultiVersionResponse {
    pub role: String,
    pub versions: Vec<String>,
    pub count: usize,
    pub tokens_used: u64,
}

#[derive(Debug, Serialize)]
pub struct AssistantInfo {
    pub role: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}
