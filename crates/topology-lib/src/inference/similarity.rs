//! All-pairs similarity of loss fingerprints
//!
//! Each pair of fingerprints is truncated to the shorter length and compared
//! with the Pearson coefficient. Pairs with too little overlap, or whose
//! coefficient is undefined, get exactly 0.0.

use crate::fingerprint::Fingerprints;
use crate::models::CellId;
use crate::stats::pearson;
use serde::Serialize;

/// Minimum overlapping samples before a correlation is trusted
pub const MIN_OVERLAP_SAMPLES: usize = 5;

/// Square similarity matrix labelled by cell identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    cells: Vec<CellId>,
    values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Entry at row `i`, column `j`
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i]
    }

    pub fn index_of(&self, cell: &str) -> Option<usize> {
        self.cells.iter().position(|c| c == cell)
    }

    /// Entry for a pair of cells, if both are present
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.at(self.index_of(a)?, self.index_of(b)?))
    }

    /// Largest absolute difference between `m[i][j]` and `m[j][i]`
    pub fn max_asymmetry(&self) -> f64 {
        let n = self.len();
        let mut worst: f64 = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                worst = worst.max((self.values[i][j] - self.values[j][i]).abs());
            }
        }
        worst
    }
}

/// Computes similarity matrices
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    min_overlap: usize,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self {
            min_overlap: MIN_OVERLAP_SAMPLES,
        }
    }

    /// Override the minimum overlap (values below 2 are raised to 2)
    pub fn with_min_overlap(min_overlap: usize) -> Self {
        Self {
            min_overlap: min_overlap.max(2),
        }
    }

    /// Compute the full matrix, rows and columns in fingerprint order
    ///
    /// Self-pairs go through the same rules as any other pair: a diagonal
    /// entry is 1.0 only when the fingerprint has enough samples and
    /// non-zero variance, otherwise 0.0.
    pub fn compute(&self, fingerprints: &Fingerprints) -> SimilarityMatrix {
        let n = fingerprints.len();
        let mut values = vec![vec![0.0; n]; n];

        for (i, row) in values.iter_mut().enumerate() {
            let a = fingerprints.series_at(i);
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.pair(a, fingerprints.series_at(j));
            }
        }

        SimilarityMatrix {
            cells: fingerprints.cells().to_vec(),
            values,
        }
    }

    /// Similarity of one pair after truncation to the common length
    pub fn pair(&self, a: &[f64], b: &[f64]) -> f64 {
        let overlap = a.len().min(b.len());
        if overlap < self.min_overlap {
            return 0.0;
        }
        pearson(&a[..overlap], &b[..overlap]).unwrap_or(0.0)
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprints(pairs: Vec<(&str, Vec<f64>)>) -> Fingerprints {
        Fingerprints::from_pairs(pairs)
    }

    #[test]
    fn test_identical_series_correlate_fully() {
        let series = vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        let fp = fingerprints(vec![("1", series.clone()), ("2", series)]);
        let matrix = SimilarityEngine::new().compute(&fp);
        assert!((matrix.get("1", "2").unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.at(0, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_overlap_forced_to_zero() {
        // Identical prefixes, but only four overlapping samples
        let fp = fingerprints(vec![
            ("1", vec![0.0, 1.0, 0.0, 1.0]),
            ("2", vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0]),
        ]);
        let matrix = SimilarityEngine::new().compute(&fp);
        assert_eq!(matrix.at(0, 1), 0.0);
        assert_eq!(matrix.at(1, 0), 0.0);
        // Self-pair of the short series also falls under the overlap rule
        assert_eq!(matrix.at(0, 0), 0.0);
        assert!((matrix.at(1, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_truncates_to_shorter_series() {
        let fp = fingerprints(vec![
            ("1", vec![0.0, 1.0, 0.0, 1.0, 0.0]),
            ("2", vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0]),
        ]);
        let matrix = SimilarityEngine::new().compute(&fp);
        assert!((matrix.at(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_forced_to_zero() {
        let fp = fingerprints(vec![
            ("1", vec![1.0; 8]),
            ("2", vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
        ]);
        let matrix = SimilarityEngine::new().compute(&fp);
        assert_eq!(matrix.at(0, 1), 0.0);
        assert_eq!(matrix.at(0, 0), 0.0);
        assert!(matrix.at(0, 1).is_finite());
    }

    #[test]
    fn test_empty_fingerprint_rows_are_zero() {
        let fp = fingerprints(vec![("1", vec![]), ("2", vec![0.0, 1.0, 0.0, 1.0, 1.0])]);
        let matrix = SimilarityEngine::new().compute(&fp);
        assert_eq!(matrix.row(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_matrix_is_symmetric_and_ordered() {
        let fp = fingerprints(vec![
            ("9", vec![0.0, 0.2, 0.9, 0.1, 0.5, 0.7]),
            ("3", vec![0.3, 0.1, 0.8, 0.0, 0.6, 0.2]),
            ("5", vec![1.0, 0.0, 0.4, 0.4, 0.9, 0.1]),
        ]);
        let matrix = SimilarityEngine::new().compute(&fp);
        assert_eq!(matrix.cells(), &["9", "3", "5"]);
        assert!(matrix.max_asymmetry() < 1e-12);
        for i in 0..3 {
            for j in 0..3 {
                let v = matrix.at(i, j);
                assert!((-1.0..=1.0).contains(&v), "entry {} out of range", v);
            }
        }
    }
}
