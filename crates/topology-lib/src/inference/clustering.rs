//! Threshold clustering of the similarity graph
//!
//! Cells are nodes; an undirected edge joins two distinct cells whose
//! similarity is strictly greater than the threshold. Each connected
//! component becomes one link group. A similarity exactly equal to the
//! threshold never creates an edge.

use super::similarity::SimilarityMatrix;
use crate::error::TopologyError;
use crate::models::{sort_cell_ids, CellId, LinkMap};
use std::collections::VecDeque;

/// Default similarity threshold for linking cells
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Prefix of generated link labels (`Link_1`, `Link_2`, ...)
pub const LINK_LABEL_PREFIX: &str = "Link_";

/// Groups cells into links by thresholding a similarity matrix
#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    threshold: f64,
}

impl ClusteringEngine {
    /// Create an engine; the threshold must be a finite value in [-1, 1]
    pub fn new(threshold: f64) -> Result<Self, TopologyError> {
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(TopologyError::InvalidConfig(format!(
                "similarity threshold must be within [-1, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Partition every cell of the matrix into link groups
    ///
    /// Components are discovered by breadth-first search seeded in matrix
    /// order, so `Link_1` always contains the first cell of the matrix.
    pub fn cluster(&self, matrix: &SimilarityMatrix) -> LinkMap {
        let adjacency = self.adjacency(matrix);
        let n = adjacency.len();

        let mut visited = vec![false; n];
        let mut links = LinkMap::new();
        let mut queue = VecDeque::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);

            let mut members: Vec<CellId> = Vec::new();
            while let Some(node) = queue.pop_front() {
                members.push(matrix.cells()[node].clone());
                for &next in &adjacency[node] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            sort_cell_ids(&mut members);
            let label = format!("{}{}", LINK_LABEL_PREFIX, links.len() + 1);
            links.insert(label, members);
        }

        links
    }

    /// Number of undirected edges above the threshold
    pub fn edge_count(&self, matrix: &SimilarityMatrix) -> usize {
        self.adjacency(matrix).iter().map(Vec::len).sum::<usize>() / 2
    }

    fn linked(&self, matrix: &SimilarityMatrix, i: usize, j: usize) -> bool {
        matrix.at(i, j) > self.threshold || matrix.at(j, i) > self.threshold
    }

    fn adjacency(&self, matrix: &SimilarityMatrix) -> Vec<Vec<usize>> {
        let n = matrix.len();
        let mut adjacency = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if self.linked(matrix, i, j) {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }
        adjacency
    }
}

impl Default for ClusteringEngine {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}
