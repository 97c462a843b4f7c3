//! Shared Application State
//!
//! Created once at startup and handed to every handler behind an `Arc`.
//! Also owns the wiring from `Config` to a ready `Orchestrator`, so the server
//! and the command-line client build it the same way.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use sahayak_core::{
    Orchestrator,
    generation::{GenerationService, OfflineGenerationService, OpenAICompatibleService},
    prompts::PromptLibrary,
};
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, Provider};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// Ollama's OpenAI-compatible endpoint on its default port.
const LOCAL_API_BASE: &str = "http://localhost:11434/v1";
/// Local servers ignore the key, but the client always sends one.
const LOCAL_API_KEY: &str = "local";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub provider: Provider,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, provider: Provider) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            provider,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(build_orchestrator(config)?, config.provider.clone()))
    }
}

/// API key and base URL for the configured provider, or `None` when generation stays offline.
///
/// `LLM_BASE_URL` replaces the provider's default base URL.
pub fn endpoint(config: &Config) -> anyhow::Result<Option<(&str, &str)>> {
    let (api_key, default_base) = match config.provider {
        Provider::Offline => return Ok(None),
        Provider::OpenAI => (
            config
                .openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY must be set for 'openai' provider")?,
            OPENAI_API_BASE,
        ),
        Provider::Gemini => (
            config
                .gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY must be set for 'gemini' provider")?,
            GEMINI_API_BASE,
        ),
        Provider::Local => (
            config.openai_api_key.as_deref().unwrap_or(LOCAL_API_KEY),
            LOCAL_API_BASE,
        ),
    };
    Ok(Some((
        api_key,
        config.llm_base_url.as_deref().unwrap_or(default_base),
    )))
}

/// The generation backend selected by `LLM_PROVIDER`.
pub fn generation_service(config: &Config) -> anyhow::Result<Arc<dyn GenerationService>> {
    let Some((api_key, api_base)) = endpoint(config)? else {
        info!("Using offline generation; no requests leave this process.");
        return Ok(Arc::new(OfflineGenerationService));
    };
    info!(provider = config.provider.as_str(), api_base, "Using OpenAI-compatible provider.");
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base);
    Ok(Arc::new(OpenAICompatibleService::new(
        openai_config,
        config.generation_timeout,
    )))
}

/// Built-in prompts, overridden by any `*.md` files under `PROMPTS_PATH`.
pub fn prompt_library(config: &Config) -> anyhow::Result<PromptLibrary> {
    match &config.prompts_path {
        Some(path) => PromptLibrary::with_overrides_from(path)
            .with_context(|| format!("Failed to load prompts from {}", path.display())),
        None => Ok(PromptLibrary::builtin()),
    }
}

pub fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    Ok(Orchestrator::new(
        generation_service(config)?,
        Arc::new(prompt_library(config)?),
        config.orchestrator_settings(),
    ))
}
