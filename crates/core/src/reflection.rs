//! Reflection records and digest records.
//!
//! A `ReflectionRecord` is one cycle's raw output: a free-text summary
//! plus optional mood sketch, foresight text, and recurring anchor
//! terms. Records are append-only; the aggregator only reads a
//! time-ordered window of them and derives a `DigestRecord`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counts of what went into one reflection cycle's context.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContextStats {
    pub messages: usize,
    pub fragments: usize,
    pub snapshots: usize,
}

/// One reflection cycle's raw output. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionRecord {
    /// Unique record ID
    pub id: String,

    /// The cycle date
    pub date: DateTime<Utc>,

    /// Free-text summary of the cycle (required)
    pub summary: String,

    /// Free-text mood sketch, if one was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_sketch: Option<String>,

    /// Forward-looking free text, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foresight: Option<String>,

    /// Recurring theme terms attached to this record
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<String>,

    /// The raw prompt that produced this record, if retained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_prompt: Option<String>,

    /// Model identifier that produced the summary
    pub model: String,

    /// Wall-clock duration of the cycle in seconds
    pub elapsed_secs: f64,

    /// What context was folded into the cycle, if measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_stats: Option<ContextStats>,
}

impl ReflectionRecord {
    /// Create a record with a fresh id and only the required fields set.
    pub fn new(date: DateTime<Utc>, summary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            summary: summary.into(),
            mood_sketch: None,
            foresight: None,
            anchors: Vec::new(),
            raw_prompt: None,
            model: model.into(),
            elapsed_secs: 0.0,
            context_stats: None,
        }
    }
}

/// The aggregated, multi-record summary artifact.
/// One per aggregation call; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestRecord {
    /// Unique digest ID
    pub id: String,

    /// The target date of the aggregation
    pub date: DateTime<Utc>,

    /// One-line headline
    pub headline: String,

    /// Ranked key insights
    pub key_insights: Vec<String>,

    /// Qualitative mood-trend label, if one was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_trend: Option<String>,

    /// Short list of actionable items
    pub actionable_items: Vec<String>,

    /// Recurring weekly observations. `None` means "not enough data",
    /// which is distinct from "no patterns found".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_patterns: Option<Vec<String>>,

    /// IDs of the reflection records this digest was derived from
    pub source_ids: Vec<String>,
}
