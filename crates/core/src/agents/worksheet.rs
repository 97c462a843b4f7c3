use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::{Agent, AgentContext, finish, json, request_metadata};
use crate::language::language_template;
use crate::prompts::{WORKSHEET_GENERATION, WORKSHEET_SYSTEM};
use crate::task::{AgentKind, AgentResponse, TaskRequest, TaskType};

pub const DEFAULT_SKILLS: &str = "comprehension, application, analysis";

/// Differentiated worksheets with one section per difficulty band present in the class.
pub struct WorksheetAgent {
    ctx: AgentContext,
}

impl WorksheetAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn build_worksheet(&self, request: &TaskRequest) -> Result<AgentResponse> {
        let grades = self.ctx.check_request(request)?;
        let levels = grades.difficulty_levels();
        let counts = levels.question_counts();
        let skills = request.param_str("skills").unwrap_or(DEFAULT_SKILLS);
        let labels = language_template(&request.language);

        let band = |g: &[u8]| {
            if g.is_empty() {
                "none".to_string()
            } else {
                g.iter().map(u8::to_string).collect::<Vec<_>>().join(", ")
            }
        };
        let (basic, intermediate, advanced) = (
            band(&levels.basic),
            band(&levels.intermediate),
            band(&levels.advanced),
        );
        let (basic_count, intermediate_count, advanced_count) = (
            counts.basic.to_string(),
            counts.intermediate.to_string(),
            counts.advanced.to_string(),
        );

        let (content, model) = self
            .ctx
            .generate(TaskType::Worksheet, WORKSHEET_SYSTEM, WORKSHEET_GENERATION, &[
                ("topic", request.topic.as_str()),
                ("grade_level", request.grade_level.as_str()),
                ("subject", request.subject.as_str()),
                ("language", request.language.as_str()),
                ("skills", skills),
                ("basic_grades", basic.as_str()),
                ("basic_count", basic_count.as_str()),
                ("intermediate_grades", intermediate.as_str()),
                ("intermediate_count", intermediate_count.as_str()),
                ("advanced_grades", advanced.as_str()),
                ("advanced_count", advanced_count.as_str()),
                ("level_label", labels.level),
                ("instructions_label", labels.instructions),
                ("questions_label", labels.questions),
            ])
            .await?;

        let mut metadata = request_metadata(request, &grades, &model);
        metadata.insert("difficulty_levels".into(), json(&levels));
        metadata.insert("question_counts".into(), json(counts));
        metadata.insert("skills_targeted".into(), skills.into());
        Ok(AgentResponse::completed(self.kind().name(), content, metadata))
    }
}

#[async_trait]
impl Agent for WorksheetAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::WorksheetAgent
    }

    #[instrument(skip_all, fields(topic = %request.topic))]
    async fn invoke(&self, request: &TaskRequest) -> AgentResponse {
        finish(self.kind(), "worksheet", self.build_worksheet(request).await)
    }
}
