//! Generation Service
//!
//! The only outbound dependency of the core: a text completion collaborator.
//! Retry and timeout policy belong to the implementation; callers only see
//! success or failure.

use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Per-call parameters handed to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Defines the contract for any service that can complete a prompt.
///
/// Swapping implementations (hosted LLM, local model, deterministic offline
/// generator) does not affect the agents, the dispatcher or the merger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Completes `prompt` and returns the generated text.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

/// An implementation of `GenerationService` for any OpenAI-compatible API.
pub struct OpenAICompatibleService {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAICompatibleService {
    /// Creates a new service.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL of the provider.
    /// * `timeout` - Upper bound for a single completion call.
    pub fn new(config: OpenAIConfig, timeout: Duration) -> Self {
        Self {
            client: Client::with_config(config),
            timeout,
        }
    }
}

#[async_trait]
impl GenerationService for OpenAICompatibleService {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&params.model)
            .temperature(params.temperature)
            .max_completion_tokens(params.max_tokens)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(params.system_prompt.clone())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        debug!(model = %params.model, prompt_len = prompt.len(), "Requesting completion");
        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow!("Generation timed out after {:?}", self.timeout))??;

        let content = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .clone()
            .context("No content in LLM response")?;

        Ok(content)
    }
}

/// A deterministic `GenerationService` for local development and integration tests.
///
/// Echoes the model and prompt back, so output is stable across runs and no
/// external service or API key is needed.
pub struct OfflineGenerationService;

#[async_trait]
impl GenerationService for OfflineGenerationService {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        Ok(format!(
            "[offline draft from {}]\n\n{}",
            params.model,
            prompt.trim()
        ))
    }
}
