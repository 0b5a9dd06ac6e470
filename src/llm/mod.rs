// src/llm/mod.rs
// LLM provider adapter: provider clients, mock path and the generation service

pub mod anthropic;
pub mod custom;
pub mod http_client;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod openai_compat;
pub mod provider;
pub mod service;

pub use http_client::LlmHttpClient;
pub use provider::{CompletionParams, GenerationResult, LlmClient, ProviderError, ProviderKind};
pub use service::{AiService, GenerationRequest};
