//! Brute-force top-k similarity ranking.
//!
//! # Algorithm
//!
//! 1. Score every record whose embedding is present and has the same
//!    length as the query with [`cosine_similarity`]; zero-norm vectors
//!    score exactly `0.0`.
//! 2. Skip records without an embedding or with a different length.
//! 3. Sort by score descending with a stable sort, so records with equal
//!    scores keep their scan order (first seen wins).
//! 4. Truncate to `k`.
//!
//! Every record is visited on every query. This exhaustive scan is the
//! reference ranking; an approximate index would change observable results.

use crate::embedding::cosine_similarity;
use crate::models::{DocumentRecord, SearchResult, PREVIEW_CHARS};
use crate::normalize::truncate_chars;

/// Rank `records` against `query` and return at most `k` results.
pub fn rank(query: &[f32], records: &[DocumentRecord], k: usize) -> Vec<SearchResult> {
    let mut scored: Vec<(f64, &DocumentRecord)> = records
        .iter()
        .filter_map(|record| {
            let embedding = record.embedding.as_deref()?;
            if embedding.len() != query.len() {
                tracing::debug!(
                    id = %record.id,
                    expected = query.len(),
                    actual = embedding.len(),
                    "skipping record with mismatched embedding"
                );
                return None;
            }
            Some((cosine_similarity(query, embedding), record))
        })
        .collect();

    // `sort_by` is stable: ties keep scan order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(score, record)| SearchResult {
            source_name: record.source_name.clone(),
            text_preview: truncate_chars(&record.normalized_text, PREVIEW_CHARS).to_string(),
            score,
        })
        .collect()
}
