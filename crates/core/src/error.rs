//! Error Types
//!
//! Typed errors for the orchestration core. Validation problems are always
//! recoverable and reported back to the caller; agent failures are converted
//! into failed `AgentResponse`s at the agent boundary and never abort a dispatch.

/// A malformed `TaskRequest` or one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid task type: {0}")]
    InvalidTaskType(String),
    #[error("Invalid grade level format: {0}")]
    InvalidGradeFormat(String),
    #[error("Language '{0}' is not supported")]
    UnsupportedLanguage(String),
}

/// Top-level error for the orchestration core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SahayakError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),
    #[error("No agent registered for {0}")]
    UnregisteredAgent(String),
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("{agent} failed: {message}")]
    AgentInvocation { agent: String, message: String },
    #[error("Cannot merge agent outputs: {0}")]
    Merge(String),
}

pub type Result<T, E = SahayakError> = std::result::Result<T, E>;
