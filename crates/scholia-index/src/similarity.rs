//! Cosine scoring of stored chunk vectors against one query.

use std::cmp::Ordering;

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `v` to unit length. A zero vector is left as is.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// A query vector with its norm computed once for a whole index scan.
#[derive(Debug, Clone, Copy)]
pub struct QueryScorer<'a> {
    query: &'a [f32],
    norm: f32,
}

impl<'a> QueryScorer<'a> {
    pub fn new(query: &'a [f32]) -> Self {
        Self {
            query,
            norm: l2_norm(query),
        }
    }

    /// Cosine similarity in [-1, 1], or `None` when the dimensions differ.
    /// A zero vector on either side scores 0.
    pub fn score(&self, candidate: &[f32]) -> Option<f32> {
        if candidate.len() != self.query.len() {
            return None;
        }
        let candidate_norm = l2_norm(candidate);
        if self.norm == 0.0 || candidate_norm == 0.0 {
            return Some(0.0);
        }
        let dot: f32 = self.query.iter().zip(candidate).map(|(q, c)| q * c).sum();
        Some(dot / (self.norm * candidate_norm))
    }
}

/// Orders scores best first. NaN sorts last.
pub fn best_first(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.3, 0.4, 0.5];
        let score = QueryScorer::new(&v).score(&v).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_and_zero_vectors_score_zero() {
        let scorer = QueryScorer::new(&[1.0, 0.0]);
        assert_eq!(scorer.score(&[0.0, 1.0]), Some(0.0));
        assert_eq!(scorer.score(&[0.0, 0.0]), Some(0.0));
        assert_eq!(QueryScorer::new(&[0.0, 0.0]).score(&[1.0, 1.0]), Some(0.0));
    }

    #[test]
    fn mismatched_dimensions_have_no_score() {
        assert_eq!(QueryScorer::new(&[1.0, 0.0]).score(&[1.0, 0.0, 0.0]), None);
    }

    #[test]
    fn normalize_yields_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn best_first_puts_nan_last() {
        let mut scores = vec![0.2, f32::NAN, 0.9, 0.5];
        scores.sort_by(|a, b| best_first(*a, *b));
        assert_eq!(&scores[..3], &[0.9, 0.5, 0.2]);
        assert!(scores[3].is_nan());
    }
}
