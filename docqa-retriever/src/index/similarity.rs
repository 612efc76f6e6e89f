//! Cosine similarity and top-k ranking.

use docqa_context::Chunk;
use serde::Serialize;
use std::cmp::Ordering;

/// A chunk paired with its similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Cosine similarity of two vectors.
///
/// Accumulates in `f64` so large components cannot overflow. Returns 0.0 when
/// either vector has zero norm, the lengths differ, or an input is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Highest similarity first; ties go to the earlier chunk.
fn rank_order(a: &QueryResult, b: &QueryResult) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.chunk.index.cmp(&b.chunk.index))
}

/// Keep the `k` best results, ordered by [`rank_order`].
pub fn rank_top_k(mut results: Vec<QueryResult>, k: usize) -> Vec<QueryResult> {
    if k == 0 {
        return Vec::new();
    }
    results.sort_by(rank_order);
    results.truncate(k);
    results
}
