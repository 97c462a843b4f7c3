//! Axum Router Configuration
//!
//! HTTP routing for the service plus the OpenAPI document served under
//! `/swagger-ui`.

use crate::{
    handlers,
    models::{
        AnalyzePayload, ChatPayload, ConversationList, DeletedResponse, ErrorResponse,
        MergePayload, MergedDocument, OrchestratePayload, ServiceInfo, SuggestPayload,
        SuggestResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use sahayak_core::{
    AgentKind, AgentResponse, TaskRequest, TaskType,
    capabilities::{Capabilities, GradeRange, LanguageListing, SubAgentInfo, TaskTemplate},
    conversation::{Conversation, ConversationSummary, Role, Turn},
    language::LanguageInfo,
    orchestrator::{AnalyzeOutcome, ChatReply, HealthStatus, Orchestration, OrchestrationResult},
    suggestions::Suggestions,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root,
        handlers::health,
        handlers::analyze,
        handlers::generate,
        handlers::orchestrate,
        handlers::merge,
        handlers::suggest,
        handlers::capabilities,
        handlers::languages,
        handlers::task_template,
        handlers::chat,
        handlers::list_conversations,
        handlers::get_conversation,
        handlers::delete_conversation,
    ),
    components(
        schemas(
            ServiceInfo, AnalyzePayload, OrchestratePayload, MergePayload, MergedDocument,
            SuggestPayload, SuggestResponse, ChatPayload, ConversationList, DeletedResponse,
            ErrorResponse, TaskRequest, AgentResponse, TaskType, AgentKind, AnalyzeOutcome,
            Orchestration, OrchestrationResult, ChatReply, HealthStatus, Suggestions,
            Capabilities, GradeRange, SubAgentInfo, TaskTemplate, LanguageListing, LanguageInfo,
            Conversation, ConversationSummary, Turn, Role
        )
    ),
    tags(
        (name = "Sahayak API", description = "Multi-agent classroom content generation")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route("/generate", post(handlers::generate))
        .route("/orchestrate", post(handlers::orchestrate))
        .route("/merge", post(handlers::merge))
        .route("/suggest", post(handlers::suggest))
        .route("/capabilities", get(handlers::capabilities))
        .route("/languages", get(handlers::languages))
        .route("/tasks/{task_type}/template", get(handlers::task_template))
        .route("/chat", post(handlers::chat))
        .route("/conversations", get(handlers::list_conversations))
        .route(
            "/conversations/{id}",
            get(handlers::get_conversation).delete(handlers::delete_conversation),
        )
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use sahayak_core::{
        Orchestrator, generation::OfflineGenerationService, prompts::PromptLibrary,
        settings::OrchestratorSettings,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt; // for `oneshot`

    fn test_app() -> Router {
        let orchestrator = Orchestrator::new(
            Arc::new(OfflineGenerationService),
            Arc::new(PromptLibrary::builtin()),
            OrchestratorSettings::default(),
        );
        create_router(Arc::new(AppState::new(orchestrator, Provider::Offline)))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = send(test_app(), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["provider"], "offline");

        let (status, body) = send(test_app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["registered_agents"], 5);
    }

    #[tokio::test]
    async fn test_analyze() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/analyze",
            Some(json!({"user_input": "Make a worksheet on fractions for grade 5"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["task_request"]["task_type"], "worksheet");
        assert_eq!(body["task_request"]["grade_level"], "5");
    }

    #[tokio::test]
    async fn test_generate_status_codes() {
        let ok = json!({"task_type": "story", "topic": "rain", "grade_level": "3"});
        let (status, body) = send(test_app(), Method::POST, "/generate", Some(ok)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent_type"], "story_agent");
        assert_eq!(body["metadata"]["request_validated"], true);

        let bad_grade = json!({"task_type": "story", "topic": "rain", "grade_level": "15"});
        let (status, body) = send(test_app(), Method::POST, "/generate", Some(bad_grade)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["agent_type"], "orchestrator");
        assert_eq!(body["success"], false);

        let bogus = json!({"task_type": "bogus", "topic": "rain", "grade_level": "3"});
        let (status, body) = send(test_app(), Method::POST, "/generate", Some(bogus)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_message"], "Unknown task type: bogus");
    }

    #[tokio::test]
    async fn test_orchestrate_multi_agent() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/orchestrate",
            Some(json!({"user_request": "a story and a worksheet about plants for grade 4"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["agents_invoked"], json!(["story_agent", "worksheet_agent"]));
        assert_eq!(body["complete"], true);
        assert!(
            body["merged_document"]
                .as_str()
                .unwrap()
                .contains("## 📋 Worksheet Component")
        );
    }

    #[tokio::test]
    async fn test_orchestrate_needs_clarification() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/orchestrate",
            Some(json!({"user_request": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "needs_clarification");
        assert!(body["suggestions"]["missing_information"].is_array());
    }

    #[tokio::test]
    async fn test_merge() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/merge",
            Some(json!({
                "topic": "Water Cycle",
                "grade_level": "3-5",
                "contents": {"visual_aid_agent": "Draw clouds", "story_agent": "Rain came"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let doc = body["document"].as_str().unwrap();
        assert!(doc.starts_with("# Water Cycle - Grade 3-5 Lesson Package"));
        assert!(doc.find("Story Component").unwrap() < doc.find("Visual Aid Component").unwrap());
    }

    #[tokio::test]
    async fn test_merge_rejects_malformed_contents() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/merge",
            Some(json!({"topic": "x", "grade_level": "3", "contents": {"story_agent": 42}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Cannot merge agent outputs"));

        let (status, _) = send(
            test_app(),
            Method::POST,
            "/merge",
            Some(json!({"topic": "x", "grade_level": "3", "contents": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_suggest() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/suggest",
            Some(json!({"user_input": "something for my class"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["input_received"], "something for my class");
        assert!(!body["suggestions"]["suggested_task_types"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_descriptors() {
        let (status, body) = send(test_app(), Method::GET, "/capabilities", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["supported_task_types"].as_array().unwrap().len(), 6);

        let (status, body) = send(test_app(), Method::GET, "/languages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default_language"], "en");

        let (status, body) = send(test_app(), Method::GET, "/tasks/lesson_plan/template", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent"], "content_agent");

        let (status, _) = send(test_app(), Method::GET, "/tasks/poem/template", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_and_conversations() {
        let app = test_app();
        let (status, reply) = send(
            app.clone(),
            Method::POST,
            "/chat",
            Some(json!({"message": "a story about the moon for grade 2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = reply["conversation_id"].as_str().unwrap().to_string();

        let (_, list) = send(app.clone(), Method::GET, "/conversations", None).await;
        assert_eq!(list["count"], 1);
        assert_eq!(list["conversations"][0]["turn_count"], 2);

        let uri = format!("/conversations/{id}");
        let (status, conversation) = send(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(conversation["turns"][0]["role"], "user");
        assert_eq!(conversation["turns"][1]["role"], "assistant");

        let (status, body) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        let (status, _) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let (status, body) = send(
            test_app(),
            Method::POST,
            "/chat",
            Some(json!({"message": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "message is required");
    }

    #[test]
    fn test_openapi_document_lists_every_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/analyze",
            "/generate",
            "/orchestrate",
            "/merge",
            "/suggest",
            "/capabilities",
            "/languages",
            "/tasks/{task_type}/template",
            "/chat",
            "/conversations",
            "/conversations/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
