//! Orchestrator
//!
//! The single entry point used by the HTTP service and the CLI. It wires the
//! classifier, the dispatcher, the merger and the conversation store together:
//!
//! raw text -> classify -> validate -> plan -> concurrent dispatch -> merge

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::agents::AgentContext;
use crate::capabilities::{
    Capabilities, LanguageListing, TaskTemplate, capabilities, language_listing, task_template,
};
use crate::classifier::{Classifier, KeywordClassifier, RequestAnalysis};
use crate::conversation::{
    Conversation, ConversationStore, ConversationSummary, InMemoryConversationStore, Turn,
};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::generation::GenerationService;
use crate::merger::MergeInput;
use crate::prompts::PromptLibrary;
use crate::settings::{ORCHESTRATOR_VERSION, OrchestratorSettings};
use crate::suggestions::{Suggestions, provide_suggestions};
use crate::task::{AgentResponse, TaskRequest, TaskType};
use crate::validation::{sanitize_input, validate_task_request};

/// Result of classifying free text without generating anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalyzeOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_request: Option<TaskRequest>,
    pub task_types: Vec<TaskType>,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Suggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Everything produced for one multi-agent request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrchestrationResult {
    pub request: TaskRequest,
    pub agents_invoked: Vec<String>,
    /// One response per invoked agent, in routing-table order.
    pub responses: Vec<AgentResponse>,
    /// Absent when no agent produced content.
    pub merged_document: Option<String>,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Orchestration {
    Completed(OrchestrationResult),
    NeedsClarification { suggestions: Suggestions },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatReply {
    pub conversation_id: String,
    pub response: String,
    pub agents_invoked: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub registered_agents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct Orchestrator {
    classifier: Arc<dyn Classifier>,
    dispatcher: Dispatcher,
    conversations: Arc<dyn ConversationStore>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// An orchestrator with the keyword classifier, every built-in agent and an in-memory store.
    pub fn new(
        generator: Arc<dyn GenerationService>,
        prompts: Arc<PromptLibrary>,
        settings: OrchestratorSettings,
    ) -> Self {
        let ctx = AgentContext::new(generator, prompts)
            .with_models(settings.models.clone())
            .with_languages(settings.languages.clone());
        Self {
            classifier: Arc::new(KeywordClassifier::new()),
            dispatcher: Dispatcher::with_builtin_agents(ctx),
            conversations: Arc::new(InMemoryConversationStore::new()),
            settings,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = store;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    fn classify(&self, text: &str, language: Option<&str>) -> RequestAnalysis {
        let language = language.unwrap_or(&self.settings.languages.default_language);
        self.classifier.analyze(text, Some(language))
    }

    /// Classifies and validates `text`; returns suggestions instead of a request when validation fails.
    #[instrument(skip(self))]
    pub fn analyze(&self, text: &str, language: Option<&str>) -> AnalyzeOutcome {
        let analysis = self.classify(text, language);
        match validate_task_request(&analysis.request, &self.settings.languages.supported_languages) {
            Ok(validated) => AnalyzeOutcome {
                success: true,
                task_request: Some(validated.request),
                task_types: analysis.task_types,
                confidence: analysis.confidence,
                suggestions: None,
                error_message: None,
            },
            Err(e) => AnalyzeOutcome {
                success: false,
                task_request: None,
                task_types: analysis.task_types.clone(),
                confidence: analysis.confidence,
                suggestions: Some(provide_suggestions(&analysis, Some(&e))),
                error_message: Some(e.to_string()),
            },
        }
    }

    /// Suggestions for refining `text`, whether or not it would validate.
    pub fn suggest(&self, text: &str) -> Suggestions {
        let analysis = self.classify(text, None);
        let failure =
            validate_task_request(&analysis.request, &self.settings.languages.supported_languages)
                .err();
        provide_suggestions(&analysis, failure.as_ref())
    }

    /// Routes one structured request to its agent.
    pub async fn generate(&self, request: &TaskRequest) -> AgentResponse {
        self.dispatcher.dispatch(request).await
    }

    /// Full pipeline for free text: every mentioned task type is dispatched and the results merged.
    #[instrument(skip(self))]
    pub async fn orchestrate(&self, text: &str) -> Result<Orchestration> {
        let analysis = self.classify(text, None);
        let validated = match validate_task_request(
            &analysis.request,
            &self.settings.languages.supported_languages,
        ) {
            Ok(validated) => validated,
            Err(e) => {
                info!(reason = %e, "Request needs clarification");
                return Ok(Orchestration::NeedsClarification {
                    suggestions: provide_suggestions(&analysis, Some(&e)),
                });
            }
        };

        let plan = self.dispatcher.plan(&validated.request, &analysis.task_types)?;
        let outcome = self.dispatcher.dispatch_plan(&plan).await;

        let mut merge_input = MergeInput::new(&validated.request.topic, &validated.request.grade_level);
        for (agent, content) in outcome.successful_contents() {
            merge_input = merge_input.with_content(agent, content);
        }
        let merged_document = match merge_input.merge() {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(error = %e, "Nothing to merge");
                None
            }
        };

        Ok(Orchestration::Completed(OrchestrationResult {
            request: validated.request,
            agents_invoked: plan.agent_names().into_iter().map(String::from).collect(),
            complete: outcome.is_complete(),
            responses: outcome.responses,
            merged_document,
        }))
    }

    pub fn merge(&self, input: &MergeInput) -> Result<String> {
        input.merge()
    }

    /// One chat turn: the user message is recorded, orchestrated and answered in the same conversation.
    ///
    /// The user turn is committed before generation starts and stays recorded
    /// even if the call is cancelled afterwards.
    #[instrument(skip(self, message))]
    pub async fn chat(&self, conversation_id: Option<String>, message: &str) -> Result<ChatReply> {
        let conversation_id = self.conversations.create(conversation_id).await;
        let message = sanitize_input(message);
        self.conversations
            .append(&conversation_id, Turn::user(message.clone()))
            .await?;

        let (response, agents_invoked) = match self.orchestrate(&message).await? {
            Orchestration::Completed(result) => {
                let text = result
                    .merged_document
                    .clone()
                    .unwrap_or_else(|| failure_summary(&result.responses));
                (text, result.agents_invoked)
            }
            Orchestration::NeedsClarification { suggestions } => {
                (clarification_summary(&suggestions), Vec::new())
            }
        };

        self.conversations
            .append(&conversation_id, Turn::assistant(response.clone()))
            .await?;
        Ok(ChatReply {
            conversation_id,
            response,
            agents_invoked,
        })
    }

    pub async fn conversations(&self) -> Vec<ConversationSummary> {
        self.conversations.list().await
    }

    pub async fn conversation(&self, id: &str) -> Option<Conversation> {
        self.conversations.get(id).await
    }

    pub async fn delete_conversation(&self, id: &str) -> bool {
        self.conversations.delete(id).await
    }

    pub fn capabilities(&self) -> Capabilities {
        capabilities(&self.settings.languages)
    }

    pub fn languages(&self) -> LanguageListing {
        language_listing(&self.settings.languages)
    }

    pub fn task_template(&self, task_type: &str) -> Result<TaskTemplate> {
        Ok(task_template(task_type.parse()?))
    }

    /// Runs a canned request through the same validation used for real requests.
    pub fn health(&self) -> HealthStatus {
        let canned = TaskRequest::new(TaskType::Story, "health check", "3")
            .with_language(&self.settings.languages.default_language);
        let registered_agents = self.dispatcher.registered_agents().len();
        match validate_task_request(&canned, &self.settings.languages.supported_languages) {
            Ok(_) if registered_agents > 0 => HealthStatus {
                status: "healthy",
                version: ORCHESTRATOR_VERSION,
                registered_agents,
                error: None,
            },
            Ok(_) => HealthStatus {
                status: "unhealthy",
                version: ORCHESTRATOR_VERSION,
                registered_agents,
                error: Some("no agents registered".into()),
            },
            Err(e) => HealthStatus {
                status: "unhealthy",
                version: ORCHESTRATOR_VERSION,
                registered_agents,
                error: Some(e.to_string()),
            },
        }
    }
}

fn failure_summary(responses: &[AgentResponse]) -> String {
    let reasons: Vec<String> = responses
        .iter()
        .filter_map(|r| r.error_message.as_ref().map(|e| format!("- {}: {e}", r.agent_type)))
        .collect();
    format!("I could not generate any material this time.\n{}", reasons.join("\n"))
}

fn clarification_summary(suggestions: &Suggestions) -> String {
    let mut text = String::from("I need a little more information to help you.");
    if !suggestions.missing_information.is_empty() {
        text.push_str("\nPlease tell me: ");
        text.push_str(&suggestions.missing_information.join(", "));
    }
    let kinds: Vec<&str> = suggestions
        .suggested_task_types
        .iter()
        .map(TaskType::as_str)
        .collect();
    text.push_str("\nI can create: ");
    text.push_str(&kinds.join(", "));
    text
}
