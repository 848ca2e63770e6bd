//! Pure scoring functions for the ranker
//!
//! No IO, no async. Everything here is deterministic for a given input.

/// Added to the semantic score when need and offer share a category
pub const CATEGORY_BONUS: f64 = 0.2;

/// Cosine similarity of two vectors, in [-1, 1].
///
/// Returns 0 when either vector has zero norm (empty label) or when the
/// lengths differ, rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

pub fn category_bonus(same_category: bool) -> f64 {
    if same_category {
        CATEGORY_BONUS
    } else {
        0.0
    }
}

/// Round to 3 decimal places (the precision scores are reported at)
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Score reported for a suggestion.
///
/// Similarity is rounded before the bonus is added, so two offers with the
/// same label but different categories always report scores exactly
/// `CATEGORY_BONUS` apart.
pub fn reported_score(similarity: f64, same_category: bool) -> f64 {
    round_score(round_score(similarity) + category_bonus(same_category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_opposite_vectors() {
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric() {
        let a = [0.3, -1.2, 4.0];
        let b = [2.0, 0.5, -0.1];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_zero_vector_is_zero_not_nan() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(score, 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.123);
        assert_eq!(round_score(1.0004), 1.0);
        assert_eq!(round_score(0.9996), 1.0);
    }

    #[test]
    fn test_reported_bonus_survives_rounding_boundaries() {
        // Half-thousandth steps land on every rounding boundary in [-1, 1]
        for i in -2000..=2000 {
            for nudge in [0.0, 1e-12, -1e-12] {
                let similarity = i as f64 * 0.0005 + nudge;
                let diff = reported_score(similarity, true) - reported_score(similarity, false);
                assert!(
                    (diff - CATEGORY_BONUS).abs() < 1e-9,
                    "similarity {} reported a bonus of {}",
                    similarity,
                    diff
                );
            }
        }
    }

    #[test]
    fn test_reported_score_is_rounded() {
        assert_eq!(reported_score(0.1234, true), 0.323);
        assert_eq!(reported_score(0.1234, false), 0.123);
        assert_eq!(reported_score(1.0, true), 1.2);
    }

    #[test]
    fn test_category_bonus() {
        assert_eq!(category_bonus(true), 0.2);
        assert_eq!(category_bonus(false), 0.0);
    }
}
