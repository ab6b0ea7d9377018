//! Context composition for Reverie.
//!
//! One `build_context` call fans out to three independent sources —
//! thread history, semantic memory, environment snapshot — under a
//! single wall-clock deadline, and folds the results into an immutable
//! [`ContextPacket`] with a canonical deterministic rendering.
//!
//! | Source | Contract | On failure |
//! |--------|----------|------------|
//! | Thread history | most-recent-last | fatal, typed |
//! | Semantic search | most-similar-first | fatal, typed |
//! | Environment | point-in-time snapshot | degraded to empty |

pub mod assembler;
pub mod packet;

pub use assembler::ContextAssembler;
pub use packet::{ContextPacket, PacketMeta, SalienceWeights};
