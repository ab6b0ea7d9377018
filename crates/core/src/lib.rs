//! # Reverie Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! Reverie context-composition and reflection-digest pipeline. This
//! crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Explicit dependency injection (no process-wide singletons)
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod environment;
pub mod error;
pub mod fragment;
pub mod generate;
pub mod message;
pub mod reflection;

// Re-export key types at crate root for ergonomics
pub use environment::{
    Activity, DeviceState, EnvironmentSnapshot, EnvironmentSource, GeoLocation, HealthMetrics,
    NetworkType, ThermalState,
};
pub use error::{ContextError, Error, ProviderError, Result, SensorError, StoreError};
pub use fragment::{Embedder, FragmentMeta, FragmentSource, MemoryFragment, VectorStore};
pub use generate::TextGenerator;
pub use message::{ConversationMessage, MessageMeta, Role, ThreadId, ThreadStore};
pub use reflection::{ContextStats, DigestRecord, ReflectionRecord};
