//! Static descriptors: what the orchestrator can do, per-task templates and
//! language details. Nothing here depends on live state.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::dispatcher::{ROUTING_TABLE, route};
use crate::grade::{GradeSet, MAX_GRADE, MIN_GRADE};
use crate::language::{LanguageInfo, language_info};
use crate::settings::{LanguageSettings, ORCHESTRATOR_VERSION};
use crate::suggestions::{story_enhancements, worksheet_adaptations};
use crate::task::{AgentKind, TaskRequest, TaskType};

pub const SUPPORTED_SUBJECTS: [&str; 8] = [
    "mathematics",
    "science",
    "environmental studies",
    "social studies",
    "history",
    "geography",
    "english",
    "hindi",
];

pub const FEATURES: [&str; 7] = [
    "intent classification",
    "multi-grade differentiation",
    "concurrent multi-agent dispatch",
    "lesson package merging",
    "regional language support",
    "conversation history",
    "request suggestions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GradeRange {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubAgentInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub task_types: Vec<TaskType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Capabilities {
    pub version: &'static str,
    pub supported_task_types: Vec<TaskType>,
    pub supported_languages: Vec<String>,
    pub supported_subjects: Vec<&'static str>,
    pub grade_range: GradeRange,
    pub features: Vec<&'static str>,
    pub sub_agents: Vec<SubAgentInfo>,
}

pub fn capabilities(languages: &LanguageSettings) -> Capabilities {
    let mut sub_agents: Vec<SubAgentInfo> = Vec::new();
    for (task, agent) in ROUTING_TABLE {
        match sub_agents.iter_mut().find(|info| info.name == agent.name()) {
            Some(info) => info.task_types.push(task),
            None => sub_agents.push(SubAgentInfo {
                name: agent.name(),
                description: agent.description(),
                task_types: vec![task],
            }),
        }
    }

    Capabilities {
        version: ORCHESTRATOR_VERSION,
        supported_task_types: TaskType::ALL.to_vec(),
        supported_languages: languages.supported_languages.clone(),
        supported_subjects: SUPPORTED_SUBJECTS.to_vec(),
        grade_range: GradeRange {
            min: MIN_GRADE,
            max: MAX_GRADE,
        },
        features: FEATURES.to_vec(),
        sub_agents,
    }
}

/// Example request and expected output shape for one task type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaskTemplate {
    pub task_type: TaskType,
    pub agent: AgentKind,
    pub description: &'static str,
    pub example_request: TaskRequest,
    pub expected_output: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub enhancements: Option<Value>,
}

pub fn task_template(task: TaskType) -> TaskTemplate {
    let (description, example_request, expected_output, enhancements) = match task {
        TaskType::Story => {
            let request = TaskRequest::new(task, "honesty", "2-4").with_subject("moral education");
            let grades = GradeSet::new([2, 3, 4]).ok();
            (
                "A culturally grounded story with discussion questions and a moral",
                request,
                vec!["story", "discussion questions", "moral"],
                grades.map(|g| json!(story_enhancements(&g))),
            )
        }
        TaskType::Worksheet => {
            let adaptations: serde_json::Map<String, Value> = worksheet_adaptations()
                .into_iter()
                .map(|(learner, ideas)| (learner.to_string(), json!(ideas)))
                .collect();
            (
                "A worksheet with basic, intermediate and advanced sections and an answer key",
                TaskRequest::new(task, "multiplication", "2-5")
                    .with_subject("mathematics")
                    .with_param("skills", "repeated addition, times tables"),
                vec!["leveled questions", "answer key"],
                Some(Value::Object(adaptations)),
            )
        }
        TaskType::VisualAid => (
            "A blackboard diagram with drawing steps and classroom questions",
            TaskRequest::new(task, "water cycle", "4")
                .with_subject("science")
                .with_param("objective", "Explain evaporation and rain"),
            vec!["description", "drawing steps", "usage", "questions", "materials"],
            None,
        ),
        TaskType::LessonPlan => (
            "A timed lesson plan with activities for each grade band",
            TaskRequest::new(task, "seasons", "1-5").with_subject("environmental studies"),
            vec!["objectives", "lesson flow", "activities", "materials", "assessment"],
            None,
        ),
        TaskType::Qna => (
            "A child-friendly explanation with an everyday example",
            TaskRequest::new(task, "Why do leaves change colour?", "5").with_subject("science"),
            vec!["explanation", "example"],
            None,
        ),
        TaskType::Translation => (
            "The given material translated into the requested language",
            TaskRequest::new(task, "rain story", "3")
                .with_language("hi")
                .with_param("source_text", "The rain came to the village."),
            vec!["translated text"],
            None,
        ),
    };

    TaskTemplate {
        task_type: task,
        agent: route(task),
        description,
        example_request,
        expected_output,
        enhancements,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LanguageListing {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub details: BTreeMap<String, LanguageInfo>,
}

pub fn language_listing(settings: &LanguageSettings) -> LanguageListing {
    LanguageListing {
        default_language: settings.default_language.clone(),
        supported_languages: settings.supported_languages.clone(),
        details: settings
            .supported_languages
            .iter()
            .filter_map(|code| language_info(code).map(|info| (code.clone(), info)))
            .collect(),
    }
}
