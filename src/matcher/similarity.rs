//! Cosine similarity and the percentage score used by the matcher.

use ndarray::Array1;

/// Minimum score (inclusive, 0-100 scale) for an Offer to be kept.
pub const MATCH_THRESHOLD: f64 = 60.0;

/// `MATCH_THRESHOLD` on the raw cosine scale.
pub const MIN_COSINE: f64 = 0.60;

/// Cosine similarity of two equal-length vectors, computed in f64.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "Embeddings must have same dimension (got {} and {})",
        a.len(),
        b.len()
    );

    let a: Array1<f64> = a.iter().map(|&x| f64::from(x)).collect();
    let b: Array1<f64> = b.iter().map(|&x| f64::from(x)).collect();

    let dot = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine rescaled to a percentage and rounded to two decimals.
pub fn similarity_score(a: &[f32], b: &[f32]) -> f64 {
    to_score(cosine_similarity(a, b))
}

pub fn to_score(cosine: f64) -> f64 {
    round2(cosine * 100.0)
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Closed lower bound on the unrounded cosine: 0.60 passes, 0.59996 does not
/// even though it displays as 60.00.
pub fn passes_threshold(cosine: f64) -> bool {
    cosine >= MIN_COSINE
}
