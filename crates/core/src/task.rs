//! Data contracts passed between the classifier, the dispatcher, the agents
//! and the merger.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::SahayakError;

/// Free-form key/value metadata. Backed by a sorted map so serialised output is stable.
pub type Metadata = Map<String, Value>;

/// The category of content a teacher asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TaskType {
    Story,
    Worksheet,
    VisualAid,
    LessonPlan,
    Qna,
    Translation,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Story,
        TaskType::Worksheet,
        TaskType::VisualAid,
        TaskType::LessonPlan,
        TaskType::Qna,
        TaskType::Translation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Story => "story",
            TaskType::Worksheet => "worksheet",
            TaskType::VisualAid => "visual_aid",
            TaskType::LessonPlan => "lesson_plan",
            TaskType::Qna => "qna",
            TaskType::Translation => "translation",
        }
    }

    /// Story and visual aid output benefits from the richer model.
    pub fn is_rich_content(&self) -> bool {
        matches!(self, TaskType::Story | TaskType::VisualAid)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = SahayakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| SahayakError::UnknownTaskType(s.to_string()))
    }
}

/// The specialised sub-agents a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AgentKind {
    StoryAgent,
    WorksheetAgent,
    VisualAidAgent,
    ContentAgent,
    TranslationAgent,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::StoryAgent => "story_agent",
            AgentKind::WorksheetAgent => "worksheet_agent",
            AgentKind::VisualAidAgent => "visual_aid_agent",
            AgentKind::ContentAgent => "content_agent",
            AgentKind::TranslationAgent => "translation_agent",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgentKind::StoryAgent => "Generates culturally grounded educational stories",
            AgentKind::WorksheetAgent => "Creates differentiated worksheets for multi-grade classrooms",
            AgentKind::VisualAidAgent => "Designs simple blackboard-friendly visual aids",
            AgentKind::ContentAgent => "Writes lesson plans and answers subject questions",
            AgentKind::TranslationAgent => "Translates classroom material into regional languages",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_subject() -> String {
    "general".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// A normalized unit of work for one agent.
///
/// `task_type` is kept as the caller supplied it; it is resolved against the
/// routing table at dispatch time so that an unknown value becomes a failed
/// response instead of a deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaskRequest {
    pub task_type: String,
    pub topic: String,
    pub grade_level: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub additional_params: Map<String, Value>,
}

impl TaskRequest {
    pub fn new(
        task_type: TaskType,
        topic: impl Into<String>,
        grade_level: impl Into<String>,
    ) -> Self {
        Self {
            task_type: task_type.as_str().to_string(),
            topic: topic.into(),
            grade_level: grade_level.into(),
            subject: default_subject(),
            language: default_language(),
            context: None,
            additional_params: Map::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional_params.insert(key.into(), value.into());
        self
    }

    /// Resolves `task_type` into a known `TaskType`.
    pub fn kind(&self) -> Result<TaskType, SahayakError> {
        self.task_type.parse()
    }

    /// Returns a string parameter from `additional_params`, if present.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.additional_params
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Same request re-targeted at another task type.
    pub fn retarget(&self, task_type: TaskType) -> Self {
        Self {
            task_type: task_type.as_str().to_string(),
            ..self.clone()
        }
    }
}

/// The result of one sub-agent invocation.
///
/// Built only through [`AgentResponse::completed`] and [`AgentResponse::failed`],
/// which keep `content` and `error_message` mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AgentResponse {
    pub agent_type: String,
    pub content: String,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Metadata,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AgentResponse {
    pub fn completed(agent_type: impl Into<String>, content: String, metadata: Metadata) -> Self {
        Self {
            agent_type: agent_type.into(),
            content,
            metadata,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(agent_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        let mut message = error_message.into();
        if message.trim().is_empty() {
            message = "Unknown error".to_string();
        }
        Self {
            agent_type: agent_type.into(),
            content: String::new(),
            metadata: Metadata::new(),
            success: false,
            error_message: Some(message),
        }
    }

    /// Adds a metadata entry, consuming and returning the response.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
