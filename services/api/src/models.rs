//! API Models
//!
//! Request and response bodies that exist only at the HTTP boundary. Domain
//! types such as `TaskRequest` and `AgentResponse` come from `sahayak-core`
//! and carry their own OpenAPI schemas.

use sahayak_core::conversation::ConversationSummary;
use sahayak_core::suggestions::Suggestions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub provider: &'static str,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct AnalyzePayload {
    #[schema(example = "Create a story about the water cycle for grades 3 to 5 in Hindi")]
    pub user_input: String,
    /// Overrides the service's default language for this request.
    #[schema(example = "hi")]
    pub language: Option<String>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct OrchestratePayload {
    #[schema(example = "I need a story and a worksheet about plants for grade 4")]
    pub user_request: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct MergePayload {
    #[schema(example = "Water Cycle")]
    pub topic: String,
    #[schema(example = "3-5")]
    pub grade_level: String,
    /// Agent name to generated content, e.g. `{"story_agent": "..."}`.
    #[schema(value_type = Object)]
    pub contents: Value,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct MergedDocument {
    pub document: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct SuggestPayload {
    #[schema(example = "something about plants")]
    pub user_input: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: Suggestions,
    pub input_received: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct ChatPayload {
    #[schema(example = "Make a worksheet on fractions for grade 5")]
    pub message: String,
    /// Continues an existing conversation; a new one is started when absent.
    pub conversation_id: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ConversationList {
    pub conversations: Vec<ConversationSummary>,
    pub count: usize,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyze_payload_language_is_optional() {
        let payload: AnalyzePayload =
            serde_json::from_value(json!({"user_input": "a story about rain"})).unwrap();
        assert_eq!(payload.user_input, "a story about rain");
        assert!(payload.language.is_none());

        let payload: AnalyzePayload =
            serde_json::from_value(json!({"user_input": "x", "language": "te"})).unwrap();
        assert_eq!(payload.language.as_deref(), Some("te"));
    }

    #[test]
    fn test_merge_payload_keeps_raw_contents() {
        let payload: MergePayload = serde_json::from_value(json!({
            "topic": "Plants",
            "grade_level": "4",
            "contents": {"story_agent": "Once upon a time"}
        }))
        .unwrap();
        assert_eq!(payload.contents["story_agent"], "Once upon a time");
    }

    #[test]
    fn test_chat_payload_requires_message() {
        assert!(serde_json::from_value::<ChatPayload>(json!({"conversation_id": "abc"})).is_err());
        let payload: ChatPayload = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert!(payload.conversation_id.is_none());
    }

    #[test]
    fn test_conversation_list_serialization() {
        let list = ConversationList {
            conversations: Vec::new(),
            count: 0,
        };
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"conversations": [], "count": 0})
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorResponse {
            message: "Task type not found".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"message":"Task type not found"}"#
        );
    }
}
