use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::{Agent, AgentContext, context_or_none, finish, request_metadata};
use crate::grade::GradeSet;
use crate::language::language_template;
use crate::prompts::{STORY_GENERATION, STORY_SYSTEM};
use crate::task::{AgentKind, AgentResponse, TaskRequest, TaskType};

/// Writes culturally grounded stories sized to the class.
pub struct StoryAgent {
    ctx: AgentContext,
}

impl StoryAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn write_story(&self, request: &TaskRequest) -> Result<AgentResponse> {
        let grades = self.ctx.check_request(request)?;
        let word_count = target_word_count(&grades);
        let age_group = grades.age_group();
        let template = language_template(&request.language);

        let (content, model) = self
            .ctx
            .generate(TaskType::Story, STORY_SYSTEM, STORY_GENERATION, &[
                ("topic", request.topic.as_str()),
                ("grade_level", request.grade_level.as_str()),
                ("language", request.language.as_str()),
                ("subject", request.subject.as_str()),
                ("context", context_or_none(request)),
                ("word_count", word_count),
                ("age_group", age_group.as_str()),
                ("greeting", template.greeting),
            ])
            .await?;

        let mut metadata = request_metadata(request, &grades, &model);
        metadata.insert("age_group".into(), age_group.as_str().into());
        metadata.insert("target_word_count".into(), word_count.into());
        Ok(AgentResponse::completed(self.kind().name(), content, metadata))
    }
}

/// Story length band by the oldest grade in the class.
pub fn target_word_count(grades: &GradeSet) -> &'static str {
    match grades.max() {
        ..=3 => "200-400 words",
        4..=6 => "400-600 words",
        _ => "600-800 words",
    }
}

#[async_trait]
impl Agent for StoryAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::StoryAgent
    }

    #[instrument(skip_all, fields(topic = %request.topic))]
    async fn invoke(&self, request: &TaskRequest) -> AgentResponse {
        finish(self.kind(), "story", self.write_story(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::*;
    use crate::grade::parse_grade_range;

    #[tokio::test]
    async fn test_story_metadata() {
        let agent = StoryAgent::new(context_returning("Once upon a time in a village..."));
        let request = TaskRequest::new(TaskType::Story, "honesty", "3").with_language("hi");

        let response = agent.invoke(&request).await;

        assert!(response.success);
        assert_eq!(response.agent_type, "story_agent");
        assert_eq!(response.content, "Once upon a time in a village...");
        assert_eq!(response.metadata["target_word_count"], "200-400 words");
        assert_eq!(response.metadata["age_group"], "primary");
        assert_eq!(response.metadata["language"], "hi");
        assert_eq!(response.metadata["model_used"], "gpt-4o");
    }

    #[tokio::test]
    async fn test_story_generation_failure() {
        let agent = StoryAgent::new(failing_context("timeout"));
        let response = agent.invoke(&TaskRequest::new(TaskType::Story, "rain", "5")).await;

        assert!(!response.success);
        assert!(response.content.is_empty());
        assert_eq!(response.error_message.as_deref(), Some("Error generating story: timeout"));
    }

    #[tokio::test]
    async fn test_story_rejects_bad_request_before_generating() {
        let agent = StoryAgent::new(unused_context());
        let response = agent.invoke(&TaskRequest::new(TaskType::Story, "", "5")).await;
        assert_eq!(
            response.error_message.as_deref(),
            Some("Error generating story: Topic is required")
        );
    }

    #[test]
    fn test_word_count_bands() {
        assert_eq!(target_word_count(&parse_grade_range("1-3").unwrap()), "200-400 words");
        assert_eq!(target_word_count(&parse_grade_range("2,6").unwrap()), "400-600 words");
        assert_eq!(target_word_count(&parse_grade_range("8").unwrap()), "600-800 words");
    }
}
