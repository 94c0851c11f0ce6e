//! Fuzzy String Similarity
//!
//! Wraps a normalized edit-distance ratio with memoization. Scores are in
//! [0, 1] with 1.0 meaning identical. The cache is keyed by the exact
//! ordered pair presented (not pair-symmetrized) and is purely a
//! performance aid: clearing it never changes results.

use std::collections::HashMap;

use strsim::normalized_levenshtein;

/// Memoizing wrapper around the similarity ratio.
///
/// The comparison itself is a pure function; this struct exists only to
/// carry the process-lifetime cache, passed by reference wherever the
/// pipeline compares strings.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    cache: HashMap<(String, String), f64>,
}

impl SimilarityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the similarity ratio between two strings.
    pub fn similarity(&mut self, a: &str, b: &str) -> f64 {
        if let Some(&score) = self.cache.get(&(a.to_string(), b.to_string())) {
            return score;
        }
        let score = normalized_levenshtein(a, b);
        self.cache.insert((a.to_string(), b.to_string()), score);
        score
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drops all memoized entries.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        let mut cache = SimilarityCache::new();
        assert_eq!(cache.similarity("diabetes", "diabetes"), 1.0);
        assert_eq!(cache.similarity("", ""), 1.0);
    }

    #[test]
    fn test_dissimilar_strings() {
        let mut cache = SimilarityCache::new();
        let score = cache.similarity("diabetes", "copd");
        assert!(score < 0.5);
    }

    #[test]
    fn test_near_match_scores_high() {
        let mut cache = SimilarityCache::new();
        let score = cache.similarity("diabetes", "diabetes-mellitus");
        assert!(score > 0.4 && score < 1.0);
    }

    #[test]
    fn test_score_in_unit_interval() {
        let mut cache = SimilarityCache::new();
        for (a, b) in [("a", "b"), ("anxiety", "anxiety disorder"), ("x", "")] {
            let score = cache.similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "{} vs {} -> {}", a, b, score);
        }
    }

    #[test]
    fn test_cache_by_ordered_pair() {
        let mut cache = SimilarityCache::new();
        cache.similarity("abc", "abd");
        cache.similarity("abd", "abc");
        // Both orderings memoized separately
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cached_result_matches_fresh() {
        let mut cache = SimilarityCache::new();
        let first = cache.similarity("hypertension", "hypotension");
        let second = cache.similarity("hypertension", "hypotension");
        assert_eq!(first, second);

        cache.clear();
        assert!(cache.is_empty());
        let fresh = cache.similarity("hypertension", "hypotension");
        assert_eq!(first, fresh);
    }
}
