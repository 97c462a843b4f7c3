use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::instrument;

use super::{Agent, AgentContext, context_or_none, finish, request_metadata};
use crate::grade::GradeSet;
use crate::prompts::{CONTENT_SYSTEM, LESSON_PLAN_GENERATION, QNA_GENERATION};
use crate::task::{AgentKind, AgentResponse, TaskRequest, TaskType};

/// Lesson plans and question answering; serves both `lesson_plan` and `qna` requests.
pub struct ContentAgent {
    ctx: AgentContext,
}

impl ContentAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn write(&self, request: &TaskRequest) -> Result<AgentResponse> {
        let task = request.kind()?;
        let prompt_key = match task {
            TaskType::LessonPlan => LESSON_PLAN_GENERATION,
            TaskType::Qna => QNA_GENERATION,
            other => bail!("content agent cannot handle '{other}' requests"),
        };
        let grades = self.ctx.check_request(request)?;
        let age_group = grades.age_group();

        let (content, model) = self
            .ctx
            .generate(task, CONTENT_SYSTEM, prompt_key, &[
                ("topic", request.topic.as_str()),
                ("grade_level", request.grade_level.as_str()),
                ("age_group", age_group.as_str()),
                ("subject", request.subject.as_str()),
                ("language", request.language.as_str()),
                ("context", context_or_none(request)),
            ])
            .await?;

        let mut metadata = request_metadata(request, &grades, &model);
        metadata.insert("age_group".into(), age_group.as_str().into());
        metadata.insert("content_kind".into(), task.as_str().into());
        metadata.insert(
            "estimated_reading_minutes".into(),
            estimated_reading_minutes(&content, &grades).into(),
        );
        Ok(AgentResponse::completed(self.kind().name(), content, metadata))
    }
}

/// Typical reading speed in words per minute for the youngest grade in the class.
fn words_per_minute(grade: u8) -> usize {
    match grade {
        1 => 30,
        2 => 50,
        3 => 70,
        4 => 90,
        5 => 110,
        6 => 130,
        7 => 150,
        8 => 170,
        _ => 100,
    }
}

pub fn estimated_reading_minutes(text: &str, grades: &GradeSet) -> usize {
    let words = text.split_whitespace().count();
    words.div_ceil(words_per_minute(grades.min())).max(1)
}

#[async_trait]
impl Agent for ContentAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::ContentAgent
    }

    #[instrument(skip_all, fields(task = %request.task_type, topic = %request.topic))]
    async fn invoke(&self, request: &TaskRequest) -> AgentResponse {
        let label = match request.kind() {
            Ok(TaskType::Qna) => "answer",
            _ => "lesson plan",
        };
        finish(self.kind(), label, self.write(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::*;
    use crate::grade::parse_grade_range;

    #[tokio::test]
    async fn test_lesson_plan() {
        let agent = ContentAgent::new(context_returning("Objectives: learn about seasons"));
        let request = TaskRequest::new(TaskType::LessonPlan, "seasons", "2,8").with_subject("evs");

        let response = agent.invoke(&request).await;

        assert!(response.success);
        assert_eq!(response.agent_type, "content_agent");
        assert_eq!(response.metadata["content_kind"], "lesson_plan");
        assert_eq!(response.metadata["age_group"], "multi_grade");
        assert_eq!(response.metadata["estimated_reading_minutes"], 1);
    }

    #[tokio::test]
    async fn test_qna_failure_label() {
        let agent = ContentAgent::new(failing_context("no choices"));
        let response = agent
            .invoke(&TaskRequest::new(TaskType::Qna, "why is the sky blue", "5"))
            .await;
        assert_eq!(response.error_message.as_deref(), Some("Error generating answer: no choices"));
    }

    #[tokio::test]
    async fn test_rejects_foreign_task_type() {
        let agent = ContentAgent::new(unused_context());
        let response = agent.invoke(&TaskRequest::new(TaskType::Story, "rain", "3")).await;
        assert!(!response.success);
        assert!(response.error_message.unwrap().contains("cannot handle 'story'"));
    }

    #[test]
    fn test_reading_minutes_use_youngest_grade() {
        let text = "word ".repeat(120);
        assert_eq!(estimated_reading_minutes(&text, &parse_grade_range("1-8").unwrap()), 4);
        assert_eq!(estimated_reading_minutes(&text, &parse_grade_range("8").unwrap()), 1);
        assert_eq!(estimated_reading_minutes(&text, &parse_grade_range("10").unwrap()), 2);
    }
}
