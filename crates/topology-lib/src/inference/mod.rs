//! Link inference from loss fingerprints
//!
//! This module provides:
//! - Pairwise similarity (Pearson correlation) over fingerprints
//! - Threshold clustering of the similarity graph into link groups
//! - Per-link confidence scoring
//! - Structural validation of the resulting link map

mod clustering;
mod confidence;
mod similarity;
mod validator;

pub use clustering::{ClusteringEngine, DEFAULT_SIMILARITY_THRESHOLD, LINK_LABEL_PREFIX};
pub use confidence::{score_links, ConfidenceScorer, SINGLETON_CONFIDENCE};
pub use similarity::{SimilarityEngine, SimilarityMatrix, MIN_OVERLAP_SAMPLES};
pub use validator::LinkValidator;
