//! Conversation Store
//!
//! Chat history behind a small async interface. Turns are append-only; a
//! conversation is removed as a whole. Appends to one conversation are
//! serialised by a per-conversation lock, so concurrent requests cannot
//! interleave partial writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, SahayakError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Conversation {
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
}

/// Listing entry for a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub created_at: DateTime<Utc>,
    pub turn_count: usize,
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Ensures a conversation exists and returns its id; a fresh UUID is used when `id` is `None`.
    async fn create(&self, id: Option<String>) -> String;

    async fn append(&self, id: &str, turn: Turn) -> Result<()>;

    async fn get(&self, id: &str) -> Option<Conversation>;

    /// Removes the whole conversation. Returns `false` if it did not exist.
    async fn delete(&self, id: &str) -> bool;

    /// All conversations, oldest first.
    async fn list(&self) -> Vec<ConversationSummary>;
}

/// Process-lifetime store backed by a map of individually locked conversations.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, id: Option<String>) -> String {
        let id = id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut conversations = self.conversations.write().await;
        conversations.entry(id.clone()).or_insert_with(|| {
            debug!(conversation_id = %id, "Creating conversation");
            Arc::new(Mutex::new(Conversation {
                conversation_id: id.clone(),
                created_at: Utc::now(),
                turns: Vec::new(),
            }))
        });
        id
    }

    async fn append(&self, id: &str, turn: Turn) -> Result<()> {
        let conversation = self
            .conversations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SahayakError::ConversationNotFound(id.to_string()))?;
        conversation.lock().await.turns.push(turn);
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<Conversation> {
        let conversation = self.conversations.read().await.get(id).cloned()?;
        let snapshot = conversation.lock().await.clone();
        Some(snapshot)
    }

    async fn delete(&self, id: &str) -> bool {
        self.conversations.write().await.remove(id).is_some()
    }

    async fn list(&self) -> Vec<ConversationSummary> {
        let handles: Vec<_> = self.conversations.read().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let conversation = handle.lock().await;
            summaries.push(ConversationSummary {
                conversation_id: conversation.conversation_id.clone(),
                created_at: conversation.created_at,
                turn_count: conversation.turns.len(),
            });
        }
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.conversation_id.cmp(&b.conversation_id))
        });
        summaries
    }
}
