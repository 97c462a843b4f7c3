//! Sahayak Core
//!
//! Orchestration core for an educational content assistant: classifies a
//! teacher's request, routes it to specialised content agents, runs them
//! concurrently and merges their output into one lesson package.

pub mod agents;
pub mod capabilities;
pub mod classifier;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod generation;
pub mod grade;
pub mod language;
pub mod merger;
pub mod orchestrator;
pub mod prompts;
pub mod settings;
pub mod suggestions;
pub mod task;
pub mod validation;

pub use error::{Result, SahayakError, ValidationError};
pub use orchestrator::Orchestrator;
pub use task::{AgentKind, AgentResponse, TaskRequest, TaskType};
