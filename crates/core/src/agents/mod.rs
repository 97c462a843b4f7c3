//! Sub-Agents
//!
//! Each agent produces one kind of classroom material. Agents never return an
//! error: every failure, from a bad request to a generation timeout, becomes a
//! failed [`AgentResponse`] so sibling agents are unaffected.

mod content;
mod story;
mod translation;
mod visual_aid;
mod worksheet;

pub use content::ContentAgent;
pub use story::StoryAgent;
pub use translation::TranslationAgent;
pub use visual_aid::{VisualAidAgent, materials_needed};
pub use worksheet::WorksheetAgent;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::generation::{GenerationParams, GenerationService};
use crate::grade::{GradeSet, parse_grade_range};
use crate::language::validate_language_support;
use crate::prompts::PromptLibrary;
use crate::settings::{LanguageSettings, ModelRouting};
use crate::task::{AgentKind, AgentResponse, Metadata, TaskRequest, TaskType};

/// A specialised content producer registered in the dispatcher's routing table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Produces content for `request`. Always returns a response.
    async fn invoke(&self, request: &TaskRequest) -> AgentResponse;
}

/// Collaborators shared by every agent.
#[derive(Clone)]
pub struct AgentContext {
    pub generator: Arc<dyn GenerationService>,
    pub prompts: Arc<PromptLibrary>,
    pub models: ModelRouting,
    pub languages: LanguageSettings,
}

impl AgentContext {
    pub fn new(generator: Arc<dyn GenerationService>, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            generator,
            prompts,
            models: ModelRouting::default(),
            languages: LanguageSettings::default(),
        }
    }

    pub fn with_models(mut self, models: ModelRouting) -> Self {
        self.models = models;
        self
    }

    pub fn with_languages(mut self, languages: LanguageSettings) -> Self {
        self.languages = languages;
        self
    }

    /// Agent-level checks run before any generation call.
    pub(crate) fn check_request(&self, request: &TaskRequest) -> Result<GradeSet> {
        if request.topic.trim().is_empty() {
            bail!("Topic is required");
        }
        if request.subject.trim().is_empty() {
            bail!("Subject is required");
        }
        if !validate_language_support(&request.language, &self.languages.supported_languages) {
            bail!("Language '{}' is not supported", request.language);
        }
        Ok(parse_grade_range(&request.grade_level)?)
    }

    /// Renders both prompts and asks the generator for text; blank output is an error.
    pub(crate) async fn generate(
        &self,
        task: TaskType,
        system_key: &str,
        prompt_key: &str,
        vars: &[(&str, &str)],
    ) -> Result<(String, String)> {
        let system_prompt = self.prompts.render(system_key, &[])?;
        let prompt = self.prompts.render(prompt_key, vars)?;
        let params = GenerationParams {
            model: self.models.model_for(task).to_string(),
            system_prompt,
            temperature: self.models.temperature,
            max_tokens: self.models.max_tokens,
        };

        debug!(task = %task, model = %params.model, "Generating content");
        let content = self.generator.complete(&prompt, &params).await?;
        if content.trim().is_empty() {
            bail!("Generated content is empty");
        }
        Ok((content, params.model))
    }
}

/// Metadata every agent reports about the request it served.
pub(crate) fn request_metadata(request: &TaskRequest, grades: &GradeSet, model: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("grade_levels".into(), grades.as_slice().into());
    metadata.insert("language".into(), request.language.clone().into());
    metadata.insert("subject".into(), request.subject.clone().into());
    metadata.insert("topic".into(), request.topic.clone().into());
    metadata.insert("model_used".into(), model.into());
    metadata
}

pub(crate) fn context_or_none(request: &TaskRequest) -> &str {
    request
        .context
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("None")
}

/// Converts an agent's internal result into the response handed back to the dispatcher.
pub(crate) fn finish(kind: AgentKind, label: &str, result: Result<AgentResponse>) -> AgentResponse {
    result.unwrap_or_else(|e| {
        warn!(agent = %kind, error = %e, "Agent invocation failed");
        AgentResponse::failed(kind.name(), format!("Error generating {label}: {e}"))
    })
}

pub(crate) fn json<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::generation::MockGenerationService;
    use anyhow::anyhow;

    pub fn context_returning(text: &'static str) -> AgentContext {
        let mut mock = MockGenerationService::new();
        mock.expect_complete()
            .returning(move |_, _| Ok(text.to_string()));
        AgentContext::new(Arc::new(mock), Arc::new(PromptLibrary::builtin()))
    }

    pub fn failing_context(message: &'static str) -> AgentContext {
        let mut mock = MockGenerationService::new();
        mock.expect_complete()
            .returning(move |_, _| Err(anyhow!(message)));
        AgentContext::new(Arc::new(mock), Arc::new(PromptLibrary::builtin()))
    }

    /// A context whose generator must never be reached.
    pub fn unused_context() -> AgentContext {
        let mut mock = MockGenerationService::new();
        mock.expect_complete().never();
        AgentContext::new(Arc::new(mock), Arc::new(PromptLibrary::builtin()))
    }
}
