//! Memory fragments and the vector-store contract.
//!
//! Fragments are append-only: once stored they are never mutated, only
//! deleted by id. Search ranks them by cosine similarity of their
//! embeddings against an embedded query.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a memory fragment originally came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentSource {
    Conversation,
    Document,
    Web,
    Sensor,
    UserInput,
    Derived,
}

/// A single semantic memory fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFragment {
    /// Unique fragment ID
    pub id: String,

    /// The text content
    pub content: String,

    /// Fixed-length embedding vector. Fragments compared across mismatched
    /// lengths score 0, never error.
    #[serde(skip)]
    pub embedding: Vec<f32>,

    /// When this fragment was created
    pub created_at: DateTime<Utc>,

    /// Origin of the fragment
    pub source: FragmentSource,

    /// Optional metadata
    #[serde(default)]
    pub meta: FragmentMeta,

    /// Similarity score (set by search operations, transient)
    #[serde(default)]
    pub score: f32,
}

/// Optional metadata carried by a fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentMeta {
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Place name attached at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    /// Free-text capture context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Importance score in 0.0–1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f32>,

    /// How many times this fragment has been retrieved
    #[serde(default)]
    pub access_count: u32,

    /// When it was last retrieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

/// The vector-store contract — semantic search over fragments.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Search fragments by query text, ranked most-similar-first.
    /// Only fragments at or above `min_similarity` are returned.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        min_similarity: f32,
    ) -> std::result::Result<Vec<MemoryFragment>, StoreError>;

    /// Store a new fragment, returning its id.
    async fn store(&self, fragment: MemoryFragment) -> std::result::Result<String, StoreError>;

    /// Delete a fragment by id. Returns true if it existed.
    async fn delete(&self, id: &str) -> std::result::Result<bool, StoreError>;

    /// Total fragment count.
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}

/// Turns text into a fixed-length embedding vector.
///
/// Kept as a separate seam so the vector store stays agnostic of how
/// embeddings are produced (remote model, local model, test stub).
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, StoreError>;
}
