//! Axum Handlers for the REST API
//!
//! Thin adapters between HTTP and the `Orchestrator`. Each handler carries a
//! `utoipa` path annotation used to build the OpenAPI document.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sahayak_core::{
    AgentResponse, TaskRequest,
    capabilities::{Capabilities, LanguageListing, TaskTemplate},
    conversation::Conversation,
    dispatcher::ORCHESTRATOR_AGENT,
    merger::MergeInput,
    orchestrator::{AnalyzeOutcome, ChatReply, HealthStatus, Orchestration},
    settings::ORCHESTRATOR_VERSION,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    models::{
        AnalyzePayload, ChatPayload, ConversationList, DeletedResponse, ErrorResponse,
        MergePayload, MergedDocument, OrchestratePayload, ServiceInfo, SuggestPayload,
        SuggestResponse,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "sahayak",
        version: ORCHESTRATOR_VERSION,
        status: "running",
        provider: state.provider.as_str(),
    })
}

/// Checks that agents are registered and a canned request passes validation.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Service is unhealthy", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.orchestrator.health();
    let code = if status.error.is_none() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Classify free text into a structured task request without generating content.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzePayload,
    responses((status = 200, description = "Classification result", body = AnalyzeOutcome))
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzePayload>,
) -> Json<AnalyzeOutcome> {
    Json(
        state
            .orchestrator
            .analyze(&payload.user_input, payload.language.as_deref()),
    )
}

/// Route a structured task request to its agent.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Content generated", body = AgentResponse),
        (status = 400, description = "Request rejected before dispatch", body = AgentResponse),
        (status = 502, description = "The agent failed to generate content", body = AgentResponse)
    )
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TaskRequest>,
) -> impl IntoResponse {
    let response = state.orchestrator.generate(&request).await;
    let code = match (response.success, response.agent_type.as_str()) {
        (true, _) => StatusCode::OK,
        (false, ORCHESTRATOR_AGENT) => StatusCode::BAD_REQUEST,
        (false, _) => StatusCode::BAD_GATEWAY,
    };
    (code, Json(response))
}

/// Classify, dispatch every mentioned task concurrently and merge the results.
#[utoipa::path(
    post,
    path = "/orchestrate",
    request_body = OrchestratePayload,
    responses(
        (status = 200, description = "Lesson package or clarification request", body = Orchestration),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn orchestrate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OrchestratePayload>,
) -> Result<Json<Orchestration>, ApiError> {
    let outcome = state.orchestrator.orchestrate(&payload.user_request).await?;
    if let Orchestration::Completed(result) = &outcome {
        info!(agents = ?result.agents_invoked, complete = result.complete, "Orchestration finished");
    }
    Ok(Json(outcome))
}

/// Merge agent outputs into a single lesson package.
#[utoipa::path(
    post,
    path = "/merge",
    request_body = MergePayload,
    responses(
        (status = 200, description = "Merged document", body = MergedDocument),
        (status = 400, description = "Malformed or empty contents", body = ErrorResponse)
    )
)]
pub async fn merge(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MergePayload>,
) -> Result<Json<MergedDocument>, ApiError> {
    let contents = MergeInput::contents_from_json(&payload.contents)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let input = MergeInput {
        topic: payload.topic,
        grade_level: payload.grade_level,
        contents,
    };
    let document = state
        .orchestrator
        .merge(&input)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(MergedDocument { document }))
}

/// Suggestions for turning vague input into a complete request.
#[utoipa::path(
    post,
    path = "/suggest",
    request_body = SuggestPayload,
    responses((status = 200, description = "Suggestions", body = SuggestResponse))
)]
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SuggestPayload>,
) -> Json<SuggestResponse> {
    let suggestions = state.orchestrator.suggest(&payload.user_input);
    Json(SuggestResponse {
        success: true,
        suggestions,
        input_received: payload.user_input,
    })
}

/// Supported task types, languages, subjects and sub-agents.
#[utoipa::path(
    get,
    path = "/capabilities",
    responses((status = 200, description = "Capability descriptor", body = Capabilities))
)]
pub async fn capabilities(State(state): State<Arc<AppState>>) -> Json<Capabilities> {
    Json(state.orchestrator.capabilities())
}

/// Supported languages with their names and scripts.
#[utoipa::path(
    get,
    path = "/languages",
    responses((status = 200, description = "Language listing", body = LanguageListing))
)]
pub async fn languages(State(state): State<Arc<AppState>>) -> Json<LanguageListing> {
    Json(state.orchestrator.languages())
}

/// Example request and expected output for one task type.
#[utoipa::path(
    get,
    path = "/tasks/{task_type}/template",
    responses(
        (status = 200, description = "Task template", body = TaskTemplate),
        (status = 404, description = "Unknown task type", body = ErrorResponse)
    ),
    params(
        ("task_type" = String, Path, description = "Task type, e.g. story or visual_aid")
    )
)]
pub async fn task_template(
    State(state): State<Arc<AppState>>,
    Path(task_type): Path<String>,
) -> Result<Json<TaskTemplate>, ApiError> {
    state
        .orchestrator
        .task_template(&task_type)
        .map(Json)
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

/// Send one chat message; the reply is recorded in the same conversation.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Assistant reply", body = ChatReply),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatReply>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }
    let reply = state
        .orchestrator
        .chat(payload.conversation_id, &payload.message)
        .await?;
    Ok(Json(reply))
}

/// List all conversations, oldest first.
#[utoipa::path(
    get,
    path = "/conversations",
    responses((status = 200, description = "Conversation summaries", body = ConversationList))
)]
pub async fn list_conversations(State(state): State<Arc<AppState>>) -> Json<ConversationList> {
    let conversations = state.orchestrator.conversations().await;
    Json(ConversationList {
        count: conversations.len(),
        conversations,
    })
}

/// Get a conversation with all of its turns.
#[utoipa::path(
    get,
    path = "/conversations/{id}",
    responses(
        (status = 200, description = "Conversation", body = Conversation),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Conversation ID")
    )
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    state
        .orchestrator
        .conversation(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Conversation with id '{}' not found", id)))
}

/// Delete a conversation and its history.
#[utoipa::path(
    delete,
    path = "/conversations/{id}",
    responses(
        (status = 200, description = "Conversation deleted", body = DeletedResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Conversation ID")
    )
)]
pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if state.orchestrator.delete_conversation(&id).await {
        info!(conversation_id = %id, "Conversation deleted");
        Ok(Json(DeletedResponse { deleted: true }))
    } else {
        Err(ApiError::NotFound(format!(
            "Conversation with id '{}' not found",
            id
        )))
    }
}
