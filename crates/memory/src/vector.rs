//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and similarity ranking over memory
//! fragments. Mismatched-length and zero-magnitude comparisons are
//! defined as similarity 0, never an error.

use reverie_core::MemoryFragment;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical direction, 0 = orthogonal,
/// -1 = opposite. Returns 0.0 if the lengths mismatch, either vector is
/// empty, or either magnitude is (near) zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank fragments by cosine similarity to a query embedding.
///
/// Returns fragments sorted by descending similarity with `score` set to
/// the similarity value. Only fragments meeting `min_similarity` are
/// included; ties keep their input order.
pub fn rank_by_similarity(
    fragments: &[MemoryFragment],
    query_embedding: &[f32],
    limit: usize,
    min_similarity: f32,
) -> Vec<MemoryFragment> {
    let mut scored: Vec<MemoryFragment> = fragments
        .iter()
        .filter_map(|fragment| {
            let sim = cosine_similarity(&fragment.embedding, query_embedding);
            if sim >= min_similarity {
                let mut f = fragment.clone();
                f.score = sim;
                Some(f)
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}
