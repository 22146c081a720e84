//! Vector similarity helpers

/// Cosine similarity. Zero-length or zero-norm inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Highest cosine similarity between `candidate` and any of `selected`.
/// Nothing selected means no redundancy.
pub fn max_similarity(candidate: &[f32], selected: &[Vec<f32>]) -> f32 {
    selected
        .iter()
        .map(|s| cosine_similarity(candidate, s))
        .fold(None, |acc: Option<f32>, s| Some(acc.map_or(s, |a| a.max(s))))
        .unwrap_or(0.0)
}

/// Scale `v` to unit length in place
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
