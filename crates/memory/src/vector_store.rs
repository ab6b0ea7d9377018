//! In-memory vector store — cosine-similarity search over fragments.
//!
//! Queries are embedded through an injected [`Embedder`], then ranked
//! against stored fragment embeddings. Fragments are append-only.

use crate::vector::rank_by_similarity;
use async_trait::async_trait;
use reverie_core::error::StoreError;
use reverie_core::fragment::{Embedder, MemoryFragment, VectorStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// An in-memory vector store backed by a Vec.
pub struct InMemoryVectorStore {
    fragments: Arc<RwLock<Vec<MemoryFragment>>>,
    embedder: Arc<dyn Embedder>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            fragments: Arc::new(RwLock::new(Vec::new())),
            embedder,
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
        min_similarity: f32,
    ) -> Result<Vec<MemoryFragment>, StoreError> {
        let query_embedding = self.embedder.embed(query).await?;
        let fragments = self.fragments.read().await;
        let results = rank_by_similarity(&fragments, &query_embedding, limit, min_similarity);
        debug!(
            query_len = query.len(),
            candidates = fragments.len(),
            matched = results.len(),
            "vector search"
        );
        Ok(results)
    }

    async fn store(&self, mut fragment: MemoryFragment) -> Result<String, StoreError> {
        if fragment.id.is_empty() {
            fragment.id = Uuid::new_v4().to_string();
        }
        let id = fragment.id.clone();
        self.fragments.write().await.push(fragment);
        Ok(id)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut fragments = self.fragments.write().await;
        let len_before = fragments.len();
        fragments.retain(|f| f.id != id);
        Ok(fragments.len() < len_before)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.fragments.read().await.len())
    }
}
