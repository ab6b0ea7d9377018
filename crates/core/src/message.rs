//! Conversation message domain types and the thread-store contract.
//!
//! Messages are immutable value objects: created once per conversation
//! turn by the thread store, read-only to everything downstream.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
}

impl Role {
    /// Lowercase label used in transcript rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single message in a conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// When the message was created
    pub created_at: DateTime<Utc>,

    /// Optional metadata attached at creation
    #[serde(default)]
    pub meta: MessageMeta,
}

/// Optional metadata carried by a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Token count, if the producer measured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u32>,

    /// Model that produced the message (assistant turns)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ConversationMessage {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            meta: MessageMeta::default(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }
}

/// The thread-store contract — append-only conversation history.
///
/// Implementations must provide their own internal synchronization:
/// the assembler reads concurrently with the store's own appends.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Fetch the most recent messages for a thread, oldest first
    /// (most-recent-last), bounded by `limit`.
    async fn fetch_recent(
        &self,
        thread: &ThreadId,
        limit: usize,
    ) -> std::result::Result<Vec<ConversationMessage>, StoreError>;

    /// Append a message to a thread.
    async fn append(
        &self,
        thread: &ThreadId,
        message: ConversationMessage,
    ) -> std::result::Result<String, StoreError>;

    /// Delete an entire thread. Returns true if it existed.
    async fn delete_thread(&self, thread: &ThreadId) -> std::result::Result<bool, StoreError>;

    /// Number of messages stored for a thread.
    async fn count(&self, thread: &ThreadId) -> std::result::Result<usize, StoreError>;
}
