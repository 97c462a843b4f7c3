use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::{Agent, AgentContext, finish};
use crate::language::{detect_language, language_info};
use crate::prompts::{TRANSLATION_GENERATION, TRANSLATION_SYSTEM};
use crate::task::{AgentKind, AgentResponse, Metadata, TaskRequest, TaskType};

/// Translates material into the request's language.
///
/// The text comes from `additional_params.source_text`, then the request
/// context, then the topic itself.
pub struct TranslationAgent {
    ctx: AgentContext,
}

impl TranslationAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn translate(&self, request: &TaskRequest) -> Result<AgentResponse> {
        self.ctx.check_request(request)?;
        let source_text = source_text(request);
        let source_language = detect_language(source_text, "en");
        let language_name = language_info(&request.language)
            .map(|info| info.name)
            .unwrap_or(request.language.as_str());

        let (content, model) = self
            .ctx
            .generate(TaskType::Translation, TRANSLATION_SYSTEM, TRANSLATION_GENERATION, &[
                ("language_name", language_name),
                ("language", request.language.as_str()),
                ("grade_level", request.grade_level.as_str()),
                ("source_text", source_text),
            ])
            .await?;

        let mut metadata = Metadata::new();
        metadata.insert("source_language".into(), source_language.into());
        metadata.insert("target_language".into(), request.language.clone().into());
        metadata.insert("language_name".into(), language_name.into());
        metadata.insert("model_used".into(), model.into());
        Ok(AgentResponse::completed(self.kind().name(), content, metadata))
    }
}

fn source_text(request: &TaskRequest) -> &str {
    request
        .param_str("source_text")
        .or_else(|| request.context.as_deref().filter(|c| !c.trim().is_empty()))
        .unwrap_or(&request.topic)
}

#[async_trait]
impl Agent for TranslationAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::TranslationAgent
    }

    #[instrument(skip_all, fields(target = %request.language))]
    async fn invoke(&self, request: &TaskRequest) -> AgentResponse {
        finish(self.kind(), "translation", self.translate(request).await)
    }
}
