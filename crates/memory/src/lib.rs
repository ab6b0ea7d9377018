//! In-memory store implementations for Reverie.
//!
//! Both stores use a single-writer/many-reader `RwLock`, so concurrent
//! assembler reads never race the stores' own appends.

pub mod thread_store;
pub mod vector;
pub mod vector_store;

pub use thread_store::InMemoryThreadStore;
pub use vector::{cosine_similarity, rank_by_similarity};
pub use vector_store::InMemoryVectorStore;
