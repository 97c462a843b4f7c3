use anyhow::Result;
use async_trait::async_trait;
use tracing::instrument;

use super::{Agent, AgentContext, finish, request_metadata};
use crate::grade::GradeSet;
use crate::prompts::{VISUAL_AID_GENERATION, VISUAL_AID_SYSTEM};
use crate::task::{AgentKind, AgentResponse, TaskRequest, TaskType};

/// Low-resource materials looked for in a generated description, most specific first.
pub const CLASSROOM_MATERIALS: [&str; 12] = [
    "colored chalk",
    "chalk",
    "blackboard",
    "chart paper",
    "paper",
    "pencil",
    "ruler",
    "stones",
    "sticks",
    "leaves",
    "seeds",
    "string",
];

const DEFAULT_MATERIALS: [&str; 2] = ["chalk", "blackboard"];

/// Blackboard-friendly diagrams with step-by-step drawing instructions.
pub struct VisualAidAgent {
    ctx: AgentContext,
}

impl VisualAidAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn design(&self, request: &TaskRequest) -> Result<AgentResponse> {
        let grades = self.ctx.check_request(request)?;
        let objective = request
            .param_str("objective")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Understand {} concepts", request.topic));
        let max_grade = grades.max().to_string();
        let drawing_time = estimated_drawing_time(&grades);

        let (content, model) = self
            .ctx
            .generate(TaskType::VisualAid, VISUAL_AID_SYSTEM, VISUAL_AID_GENERATION, &[
                ("topic", request.topic.as_str()),
                ("grade_level", request.grade_level.as_str()),
                ("subject", request.subject.as_str()),
                ("objective", objective.as_str()),
                ("language", request.language.as_str()),
                ("max_grade", max_grade.as_str()),
                ("drawing_time", drawing_time),
            ])
            .await?;

        let mut metadata = request_metadata(request, &grades, &model);
        metadata.insert("max_grade".into(), grades.max().into());
        metadata.insert("objective".into(), objective.into());
        metadata.insert("materials_needed".into(), materials_needed(&content).into());
        metadata.insert("estimated_drawing_time".into(), drawing_time.into());
        Ok(AgentResponse::completed(self.kind().name(), content, metadata))
    }
}

/// Scans generated text for known classroom materials.
///
/// A material that is part of a longer one already found ("chalk" inside
/// "colored chalk") is only counted when it also appears on its own.
pub fn materials_needed(text: &str) -> Vec<&'static str> {
    let mut lower = text.to_lowercase();
    let mut found = Vec::new();
    for material in CLASSROOM_MATERIALS {
        if lower.contains(material) {
            found.push(material);
            lower = lower.replace(material, " ");
        }
    }
    if found.is_empty() {
        DEFAULT_MATERIALS.to_vec()
    } else {
        found
    }
}

pub fn estimated_drawing_time(grades: &GradeSet) -> &'static str {
    match grades.max() {
        ..=3 => "5-7 minutes",
        4..=6 => "7-10 minutes",
        _ => "10-15 minutes",
    }
}

#[async_trait]
impl Agent for VisualAidAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::VisualAidAgent
    }

    #[instrument(skip_all, fields(topic = %request.topic))]
    async fn invoke(&self, request: &TaskRequest) -> AgentResponse {
        finish(self.kind(), "visual aid", self.design(request).await)
    }
}
