use super::error::ScoringError;

/// Cosine similarity of two equal-length vectors, in `[-1, 1]`.
///
/// Returns `0.0` when either vector has zero norm (this includes two empty vectors).
/// Sums accumulate in `f64` so large components do not overflow to infinity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, ScoringError> {
    if a.len() != b.len() {
        return Err(ScoringError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32).clamp(-1.0, 1.0))
}
