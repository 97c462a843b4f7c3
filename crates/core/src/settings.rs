//! Runtime settings for the orchestration core.
//!
//! Plain structs with sensible defaults; the API service fills them from the
//! environment, tests and the CLI use the defaults.

use serde::Serialize;

use crate::task::TaskType;

pub const ORCHESTRATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which model each kind of task is sent to, plus shared sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRouting {
    pub rich_model: String,
    pub light_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelRouting {
    fn default() -> Self {
        Self {
            rich_model: "gpt-4o".to_string(),
            light_model: "gpt-4o-mini".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

impl ModelRouting {
    pub fn model_for(&self, task: TaskType) -> &str {
        if task.is_rich_content() {
            &self.rich_model
        } else {
            &self.light_model
        }
    }

    /// Model used for routing decisions and other lightweight calls.
    pub fn routing_model(&self) -> &str {
        &self.light_model
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSettings {
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            supported_languages: vec!["en".into(), "hi".into(), "te".into()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrchestratorSettings {
    pub models: ModelRouting,
    pub languages: LanguageSettings,
}
