//! In-memory thread store — append-only conversation history.
//!
//! Backed by a tokio `RwLock` so assembler reads never race the store's
//! own appends (single-writer, many-reader).

use async_trait::async_trait;
use reverie_core::error::StoreError;
use reverie_core::message::{ConversationMessage, ThreadId, ThreadStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-memory thread store keyed by thread id.
pub struct InMemoryThreadStore {
    threads: Arc<RwLock<HashMap<ThreadId, Vec<ConversationMessage>>>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self {
            threads: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch_recent(
        &self,
        thread: &ThreadId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, StoreError> {
        let threads = self.threads.read().await;
        let messages = match threads.get(thread) {
            Some(messages) => messages,
            None => return Ok(Vec::new()),
        };

        // Last `limit` messages, chronological order preserved
        // (most-recent-last).
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn append(
        &self,
        thread: &ThreadId,
        mut message: ConversationMessage,
    ) -> Result<String, StoreError> {
        if message.id.is_empty() {
            message.id = Uuid::new_v4().to_string();
        }
        let id = message.id.clone();
        self.threads
            .write()
            .await
            .entry(thread.clone())
            .or_default()
            .push(message);
        Ok(id)
    }

    async fn delete_thread(&self, thread: &ThreadId) -> Result<bool, StoreError> {
        Ok(self.threads.write().await.remove(thread).is_some())
    }

    async fn count(&self, thread: &ThreadId) -> Result<usize, StoreError> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread)
            .map_or(0, Vec::len))
    }
}
