//! Rule-based digest heuristics — pure functions over reflection records.
//!
//! Everything here is frequency counting and case-insensitive substring
//! matching. No statistics, no randomness, no clock: identical inputs
//! always produce identical outputs.

use reverie_core::ReflectionRecord;

/// How dominant one mood polarity must be over the other to set the
/// trend. Kept literal for behavioral compatibility; tunable, not
/// load-bearing.
pub const MOOD_DOMINANCE_RATIO: f64 = 1.5;

/// Average summary length above which reflections count as "detailed".
pub const DETAILED_SUMMARY_AVG_CHARS: usize = 200;

const POSITIVE_MOOD_KEYWORDS: [&str; 8] = [
    "calm",
    "focused",
    "energized",
    "positive",
    "productive",
    "happy",
    "content",
    "balanced",
];

const NEGATIVE_MOOD_KEYWORDS: [&str; 7] = [
    "anxious",
    "stressed",
    "frustrated",
    "tired",
    "overwhelmed",
    "scattered",
    "low",
];

/// Cue words marking a foresight line as actionable.
const ACTION_CUES: [&str; 4] = ["consider", "recommend", "suggest", "try"];

/// Qualitative mood-trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodTrend {
    Positive,
    Strained,
    Mixed,
    Neutral,
}

impl MoodTrend {
    pub fn label(&self) -> &'static str {
        match self {
            MoodTrend::Positive => "trending positive and stable",
            MoodTrend::Strained => "showing signs of stress or fatigue",
            MoodTrend::Mixed => "mixed but generally balanced",
            MoodTrend::Neutral => "steady and neutral",
        }
    }
}

/// Count anchor occurrences across all records.
///
/// Returns (anchor, count) sorted by descending count. Ties break
/// first-seen-wins: the sort is stable over first-encounter order.
pub fn anchor_frequencies(records: &[ReflectionRecord]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for record in records {
        for anchor in &record.anchors {
            match counts.iter_mut().find(|(a, _)| a == anchor) {
                Some((_, count)) => *count += 1,
                None => counts.push((anchor.clone(), 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn period_label(days: usize) -> String {
    if days == 7 {
        "week".into()
    } else {
        format!("{days} days")
    }
}

/// Derive the digest headline from record count and the dominant anchor.
pub fn headline(record_count: usize, top_anchor: Option<&str>) -> String {
    match (top_anchor, record_count) {
        (Some(anchor), 1) => format!("A day focused on {anchor}"),
        (Some(anchor), n) => format!("A {} of {} and reflection", period_label(n), anchor),
        (None, 1) => "A day of reflection and growth".into(),
        (None, n) => format!("Insights from the past {}", period_label(n)),
    }
}

/// Classify the mood trend across all mood sketches.
///
/// `None` means no sketches exist at all. Sketches that contain none of
/// the keywords classify as `Neutral`, which is a different statement.
pub fn mood_trend(records: &[ReflectionRecord]) -> Option<MoodTrend> {
    let combined: String = records
        .iter()
        .filter_map(|r| r.mood_sketch.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if records.iter().all(|r| r.mood_sketch.is_none()) {
        return None;
    }

    let positive: usize = POSITIVE_MOOD_KEYWORDS
        .iter()
        .map(|kw| combined.matches(kw).count())
        .sum();
    let negative: usize = NEGATIVE_MOOD_KEYWORDS
        .iter()
        .map(|kw| combined.matches(kw).count())
        .sum();

    let trend = if positive as f64 > MOOD_DOMINANCE_RATIO * negative as f64 {
        MoodTrend::Positive
    } else if negative as f64 > MOOD_DOMINANCE_RATIO * positive as f64 {
        MoodTrend::Strained
    } else if positive == 0 && negative == 0 {
        MoodTrend::Neutral
    } else {
        MoodTrend::Mixed
    };
    Some(trend)
}

/// Build the key-insight list in its fixed order. Absent components are
/// omitted, never placeholdered.
pub fn key_insights(
    records: &[ReflectionRecord],
    frequencies: &[(String, usize)],
    trend: Option<MoodTrend>,
) -> Vec<String> {
    let mut insights = Vec::new();

    let n = records.len();
    insights.push(if n == 1 {
        "Reflected on 1 day".into()
    } else {
        format!("Reflected on {n} days")
    });

    if !frequencies.is_empty() {
        let themes: Vec<&str> = frequencies.iter().take(3).map(|(a, _)| a.as_str()).collect();
        insights.push(format!("Key themes: {}", themes.join(", ")));
    }

    if let Some(trend) = trend {
        insights.push(format!("Mood has been {}", trend.label()));
    }

    let foresight_count = records.iter().filter(|r| r.foresight.is_some()).count();
    if foresight_count > 0 {
        insights.push(format!("Generated {foresight_count} foresight insights"));
    }

    insights
}

/// Collect up to 3 actionable lines from foresight texts, verbatim and
/// trimmed. Falls back to two generic items when nothing matches.
pub fn actionable_items(records: &[ReflectionRecord], top_anchor: Option<&str>) -> Vec<String> {
    let mut items = Vec::new();

    'outer: for record in records {
        let Some(foresight) = &record.foresight else {
            continue;
        };
        for line in foresight.lines() {
            let lowered = line.to_lowercase();
            if ACTION_CUES.iter().any(|cue| lowered.contains(cue)) {
                items.push(line.trim().to_string());
                if items.len() == 3 {
                    break 'outer;
                }
            }
        }
    }

    if items.is_empty() {
        items.push(match top_anchor {
            Some(anchor) => format!("Spend more time with {anchor}, it keeps coming up"),
            None => "Note one thing you want to carry into tomorrow".into(),
        });
        items.push("Review your recent patterns for recurring themes".into());
    }

    items
}

/// Weekly-pattern observations.
///
/// `None` below 3 records (not enough data) and also when every
/// observation condition misses — never an empty list.
pub fn weekly_patterns(
    records: &[ReflectionRecord],
    frequencies: &[(String, usize)],
) -> Option<Vec<String>> {
    let n = records.len();
    if n < 3 {
        return None;
    }

    let mut observations = Vec::new();

    if let Some((anchor, count)) = frequencies.first() {
        if *count >= 3 {
            observations.push(format!("{anchor} appeared in {count} reflections"));
        }
    }

    let sketched = records.iter().filter(|r| r.mood_sketch.is_some()).count();
    if sketched * 2 >= n {
        observations.push(format!("Mood was sketched on {sketched} of {n} days"));
    }

    let avg_chars = records.iter().map(|r| r.summary.chars().count()).sum::<usize>() / n;
    if avg_chars > DETAILED_SUMMARY_AVG_CHARS {
        observations.push(format!(
            "Reflections ran detailed, averaging {avg_chars} characters"
        ));
    }

    if observations.is_empty() {
        None
    } else {
        Some(observations)
    }
}
