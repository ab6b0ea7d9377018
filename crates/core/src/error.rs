//! Error types for the Reverie domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the variants are
//! discriminated so callers can tell "source X is down" apart from
//! "ran out of time" and "upstream text generation failed".

use thiserror::Error;

/// The top-level error type for all Reverie operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Context assembly errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Sensor errors ---
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    // --- Text generation errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Fatal errors from a single `build_context` call.
///
/// Any of these means the call produced no packet. Environment-snapshot
/// failures never appear here; they degrade to an empty snapshot.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    #[error("Thread storage unavailable: {0}")]
    ThreadStorageUnavailable(String),

    #[error("Vector store unavailable: {0}")]
    VectorStoreUnavailable(String),

    #[error("Context assembly timed out after {timeout_secs}s")]
    Timeout { timeout_secs: f64 },
}

/// Errors raised by the thread and vector store collaborators.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

/// Errors raised by the environment-snapshot collaborator.
///
/// Callers of the assembler never see these; the assembler absorbs them.
#[derive(Debug, Clone, Error)]
pub enum SensorError {
    #[error("Sensor source unavailable: {0}")]
    Unavailable(String),

    #[error("Environment monitoring is not active")]
    NotMonitoring,
}

/// Errors raised by the external text-generation collaborator.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),
}
