//! The context packet — the assembler's immutable output.
//!
//! # Determinism
//!
//! `render` is a pure function of the packet: identical packets always
//! produce identical text. No random or time-dependent logic is used.

use chrono::{DateTime, Utc};
use reverie_core::environment::EnvironmentSnapshot;
use reverie_core::fragment::MemoryFragment;
use reverie_core::message::ConversationMessage;
use serde::{Deserialize, Serialize};

/// Relative-importance weights per context source.
///
/// Static constants for now — a placeholder for future dynamic
/// weighting. Downstream formatting consumes the field, so it is
/// always populated, never dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalienceWeights {
    pub recency: f32,
    pub semantic: f32,
    pub sensor: f32,
}

impl Default for SalienceWeights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            semantic: 0.4,
            sensor: 0.2,
        }
    }
}

/// Metadata about how a packet was built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketMeta {
    /// Wall-clock duration of the build, in seconds
    pub build_secs: f64,

    /// Per-source salience weights
    pub weights: SalienceWeights,
}

/// A composite, per-request context snapshot. Built fresh per request;
/// never mutated; passed downstream by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPacket {
    /// Recent thread history, most-recent-last
    pub messages: Vec<ConversationMessage>,

    /// Semantic memory fragments, most-similar-first
    pub fragments: Vec<MemoryFragment>,

    /// Point-in-time environment reading (possibly empty)
    pub environment: EnvironmentSnapshot,

    /// When the packet was assembled
    pub built_at: DateTime<Utc>,

    /// Build metadata
    pub meta: PacketMeta,
}

impl ContextPacket {
    /// Canonical text rendering, in fixed order: environment summary,
    /// relevant knowledge, recent conversation. Empty sections are
    /// omitted entirely.
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        let env_lines = self.environment_lines();
        if !env_lines.is_empty() {
            sections.push(format!("[Current Environment]\n{}", env_lines.join("\n")));
        }

        if !self.fragments.is_empty() {
            let lines: Vec<String> = self
                .fragments
                .iter()
                .enumerate()
                .map(|(i, f)| format!("{}. {}", i + 1, f.content))
                .collect();
            sections.push(format!("[Relevant Knowledge]\n{}", lines.join("\n")));
        }

        if !self.messages.is_empty() {
            let lines: Vec<String> = self
                .messages
                .iter()
                .map(|m| format!("{}: {}", m.role.as_str(), m.content))
                .collect();
            sections.push(format!("[Recent Conversation]\n{}", lines.join("\n")));
        }

        sections.join("\n\n")
    }

    fn environment_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(location) = &self.environment.location {
            let line = match &location.place_name {
                Some(place) => format!("Location: {place}"),
                None => format!(
                    "Location: {:.4}, {:.4}",
                    location.latitude, location.longitude
                ),
            };
            lines.push(line);
        }

        if let Some(activity) = self.environment.activity {
            lines.push(format!("Activity: {}", activity.as_str()));
        }

        lines
    }
}
