//! Per-link confidence scoring
//!
//! The confidence of a link is the mean similarity over every unordered
//! pair of its member cells, clamped to [0, 1]. Singleton links have no
//! pairs and score [`SINGLETON_CONFIDENCE`].

use super::similarity::SimilarityMatrix;
use crate::models::{ConfidenceMap, LinkMap};

/// Confidence assigned to links with fewer than two members
pub const SINGLETON_CONFIDENCE: f64 = 0.0;

/// Scores link groups from intra-group similarity
#[derive(Debug, Clone, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score every link of the map
    pub fn score(&self, links: &LinkMap, matrix: &SimilarityMatrix) -> ConfidenceMap {
        links
            .iter()
            .map(|(label, cells)| (label, self.score_members(cells, matrix)))
            .collect()
    }

    /// Mean pairwise similarity of a member list
    ///
    /// Members missing from the matrix are ignored.
    pub fn score_members(&self, cells: &[String], matrix: &SimilarityMatrix) -> f64 {
        let indices: Vec<usize> = cells.iter().filter_map(|c| matrix.index_of(c)).collect();
        if indices.len() < 2 {
            return SINGLETON_CONFIDENCE;
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for (k, &i) in indices.iter().enumerate() {
            for &j in &indices[k + 1..] {
                total += matrix.at(i, j);
                pairs += 1;
            }
        }

        (total / pairs as f64).clamp(0.0, 1.0)
    }
}

/// Convenience wrapper around [`ConfidenceScorer::score`]
pub fn score_links(links: &LinkMap, matrix: &SimilarityMatrix) -> ConfidenceMap {
    ConfidenceScorer::new().score(links, matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprints;
    use crate::inference::{ClusteringEngine, SimilarityEngine};

    #[test]
    fn test_tight_group_scores_one_and_singleton_zero() {
        let a = vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let b = vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let fp = Fingerprints::from_pairs(vec![("1", a.clone()), ("2", a), ("3", b)]);
        let matrix = SimilarityEngine::new().compute(&fp);
        let links = ClusteringEngine::new(0.7).unwrap().cluster(&matrix);

        let scores = score_links(&links, &matrix);
        assert_eq!(scores.len(), links.len());
        assert!((scores.get("Link_1").unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(*scores.get("Link_2").unwrap(), SINGLETON_CONFIDENCE);
    }

    #[test]
    fn test_mean_of_member_pairs() {
        // x correlates with y and z; y and z are anti-correlated with each other
        let x = vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let y = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let z = vec![0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let fp = Fingerprints::from_pairs(vec![("x", x), ("y", y), ("z", z)]);
        let matrix = SimilarityEngine::new().compute(&fp);

        let scorer = ConfidenceScorer::new();
        let members = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let expected =
            (matrix.at(0, 1) + matrix.at(0, 2) + matrix.at(1, 2)) / 3.0;
        let score = scorer.score_members(&members, &matrix);
        assert!((score - expected.clamp(0.0, 1.0)).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_unknown_members_are_ignored() {
        let fp = Fingerprints::from_pairs(vec![("1", vec![0.0, 1.0, 0.0, 1.0, 1.0])]);
        let matrix = SimilarityEngine::new().compute(&fp);
        let members = vec!["1".to_string(), "ghost".to_string()];
        assert_eq!(
            ConfidenceScorer::new().score_members(&members, &matrix),
            SINGLETON_CONFIDENCE
        );
    }
}
