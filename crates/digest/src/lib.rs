//! Reflection digest aggregation for Reverie.
//!
//! Consumes a time-ordered window of reflection records (one per
//! cycle) and derives a structured digest: headline, ranked insights,
//! a qualitative mood-trend label, actionable items, and — with enough
//! history — recurring weekly patterns. The default path is entirely
//! rule-based (keyword matching and frequency counting); an optional
//! delegated path hands the window to an external text generator and
//! parses its response through a three-stage fallback chain.

pub mod aggregator;
pub mod parse;
pub mod rules;

pub use aggregator::ReflectionAggregator;
pub use parse::{DigestParse, DigestParts};
pub use rules::{MoodTrend, DETAILED_SUMMARY_AVG_CHARS, MOOD_DOMINANCE_RATIO};
