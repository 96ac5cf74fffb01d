//! Inference pipeline orchestration
//!
//! Runs the stages in order, each producing an immutable result for the
//! next: fingerprints → similarity matrix → link map → {confidence,
//! validation warnings, capacity}. Datasets with fewer than [`MIN_CELLS`]
//! cells stop after fingerprinting.

use crate::capacity::{CapacityEstimator, DualCaptureEstimator, EstimatorKind, TransmitEstimator};
use crate::config::PipelineConfig;
use crate::error::TopologyError;
use crate::fingerprint::{FingerprintBuilder, Fingerprints};
use crate::inference::{
    ClusteringEngine, ConfidenceScorer, LinkValidator, SimilarityEngine, SimilarityMatrix,
};
use crate::models::{CapacityMap, CapacityReport, ConfidenceMap, LinkMap};
use crate::observability::{PipelineMetrics, StructuredLogger};
use crate::source::TelemetrySource;
use serde::Serialize;
use std::time::Instant;

/// Minimum number of cells for link inference to be attempted
pub const MIN_CELLS: usize = 2;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Fewer than [`MIN_CELLS`] cells; no clustering or capacity estimation
    InsufficientCells,
}

/// Immutable result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub dataset: String,
    pub status: RunStatus,
    pub threshold: f64,
    pub cell_count: usize,
    pub fingerprints: Fingerprints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityMatrix>,
    pub links: LinkMap,
    pub confidences: ConfidenceMap,
    /// Name of the capacity model that produced `capacity`, if one ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_model: Option<String>,
    pub capacity: CapacityMap,
    pub warnings: Vec<String>,
}

impl PipelineOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Composes the inference stages
pub struct Pipeline {
    config: PipelineConfig,
    similarity: SimilarityEngine,
    clustering: ClusteringEngine,
    estimator: Option<Box<dyn CapacityEstimator>>,
    metrics: PipelineMetrics,
}

impl Pipeline {
    /// Build a pipeline, validating every configured value up front
    pub fn new(config: PipelineConfig) -> Result<Self, TopologyError> {
        let clustering = ClusteringEngine::new(config.threshold)?;
        let similarity = SimilarityEngine::with_min_overlap(config.min_overlap_samples);
        let estimator: Option<Box<dyn CapacityEstimator>> = match config.estimator {
            EstimatorKind::None => None,
            EstimatorKind::Transmit => Some(Box::new(TransmitEstimator::new(&config.transmit)?)),
            EstimatorKind::Dual => Some(Box::new(DualCaptureEstimator::new(&config.dual_capture)?)),
        };

        Ok(Self {
            config,
            similarity,
            clustering,
            estimator,
            metrics: PipelineMetrics::new(),
        })
    }

    /// Replace the configured capacity model
    pub fn with_estimator(mut self, estimator: Option<Box<dyn CapacityEstimator>>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Run every stage against a telemetry snapshot
    pub fn run(&self, source: &dyn TelemetrySource) -> Result<PipelineOutcome, TopologyError> {
        let started = Instant::now();
        let logger = StructuredLogger::new(source.describe());
        self.metrics.inc_runs();

        let cells = source.list_cells()?;
        logger.log_run_started(cells.len(), self.config.threshold);

        let fingerprints = self.timed(&logger, "fingerprint", || {
            FingerprintBuilder::new(source).build_for(&cells)
        });
        self.metrics
            .set_cells_analyzed(fingerprints.len() as i64, fingerprints.empty_count() as i64);

        if cells.len() < MIN_CELLS {
            logger.log_insufficient_cells(cells.len(), MIN_CELLS);
            self.metrics.set_links(0, 0);
            return Ok(PipelineOutcome {
                dataset: source.describe(),
                status: RunStatus::InsufficientCells,
                threshold: self.config.threshold,
                cell_count: cells.len(),
                fingerprints,
                similarity: None,
                links: LinkMap::new(),
                confidences: ConfidenceMap::new(),
                capacity_model: None,
                capacity: CapacityMap::new(),
                warnings: Vec::new(),
            });
        }

        let matrix = self.timed(&logger, "similarity", || self.similarity.compute(&fingerprints));
        let links = self.timed(&logger, "clustering", || self.clustering.cluster(&matrix));
        let confidences = self.timed(&logger, "confidence", || {
            ConfidenceScorer::new().score(&links, &matrix)
        });
        let warnings = self.timed(&logger, "validation", || LinkValidator::new().validate(&links));

        for (label, members) in links.iter() {
            let confidence = confidences.get(label).copied().unwrap_or(0.0);
            logger.log_link(label, members, confidence);
        }
        for warning in &warnings {
            logger.log_validation_warning(warning);
        }

        let singletons = links.values().filter(|m| m.len() == 1).count();
        self.metrics.set_links(links.len() as i64, singletons as i64);

        let (capacity_model, capacity) = match &self.estimator {
            Some(estimator) => {
                let capacity =
                    self.timed(&logger, "capacity", || estimator.estimate(&links, source));
                for (label, report) in capacity.iter() {
                    logger.log_capacity(label, estimator.name(), report.safe_gbps());
                }
                self.record_congestion(&capacity);
                (Some(estimator.name().to_string()), capacity)
            }
            None => (None, CapacityMap::new()),
        };

        logger.log_run_finished(links.len(), warnings.len(), started.elapsed().as_secs_f64());

        Ok(PipelineOutcome {
            dataset: source.describe(),
            status: RunStatus::Completed,
            threshold: self.config.threshold,
            cell_count: cells.len(),
            fingerprints,
            similarity: Some(matrix),
            links,
            confidences,
            capacity_model,
            capacity,
            warnings,
        })
    }

    fn timed<T>(&self, logger: &StructuredLogger, stage: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed().as_secs_f64();
        self.metrics.observe_stage_latency(stage, elapsed);
        logger.log_stage(stage, elapsed);
        result
    }

    fn record_congestion(&self, capacity: &CapacityMap) {
        let worst = capacity
            .values()
            .filter_map(|r| match r {
                CapacityReport::DualCapture(d) => Some(d.congestion_score),
                _ => None,
            })
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
        if let Some(worst) = worst {
            self.metrics.set_max_congestion(worst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const PATTERN: [f64; 10] = [0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0];

    #[test]
    fn test_empty_dataset_short_circuits() {
        let source = MemorySource::builder().build();
        let outcome = Pipeline::new(PipelineConfig::default())
            .unwrap()
            .run(&source)
            .unwrap();
        assert_eq!(outcome.status, RunStatus::InsufficientCells);
        assert!(outcome.links.is_empty());
        assert!(outcome.similarity.is_none());
        assert!(outcome.capacity.is_empty());
    }

    #[test]
    fn test_single_cell_short_circuits() {
        let source = MemorySource::builder()
            .loss("1", PATTERN.to_vec())
            .transmit("1", vec![10.0])
            .build();
        let outcome = Pipeline::new(PipelineConfig::default())
            .unwrap()
            .run(&source)
            .unwrap();
        assert!(!outcome.is_complete());
        assert_eq!(outcome.cell_count, 1);
        assert_eq!(outcome.fingerprints.len(), 1);
        assert!(outcome.links.is_empty());
        assert!(outcome.warnings.is_empty());
        assert!(outcome.capacity_model.is_none());
    }

    #[test]
    fn test_full_run_with_transmit_model() {
        let source = MemorySource::builder()
            .loss("1", PATTERN.to_vec())
            .loss("2", PATTERN.to_vec())
            .loss("3", vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0])
            .transmit("1", vec![10.0, 10.0])
            .transmit("2", vec![10.0, 10.0])
            .build();
        let outcome = Pipeline::new(PipelineConfig::default())
            .unwrap()
            .run(&source)
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.links.get("Link_1").unwrap(), &vec!["1", "2"]);
        assert_eq!(outcome.links.get("Link_2").unwrap(), &vec!["3"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.capacity_model.as_deref(), Some("transmit"));
        assert_eq!(outcome.capacity.len(), 2);
        assert_eq!(outcome.capacity.get("Link_1").unwrap().safe_gbps(), Some(0.288));
        assert_eq!(outcome.confidences.len(), 2);
    }

    #[test]
    fn test_without_estimator() {
        let mut config = PipelineConfig::default();
        config.estimator = EstimatorKind::None;
        let source = MemorySource::builder()
            .loss("1", PATTERN.to_vec())
            .loss("2", PATTERN.to_vec())
            .build();
        let outcome = Pipeline::new(config).unwrap().run(&source).unwrap();
        assert!(outcome.capacity.is_empty());
        assert!(outcome.capacity_model.is_none());
        assert!(outcome.warnings.is_empty());
    }

    struct FixedEstimator;

    impl CapacityEstimator for FixedEstimator {
        fn estimate(&self, links: &LinkMap, _source: &dyn TelemetrySource) -> CapacityMap {
            links
                .labels()
                .map(|label| (label, CapacityReport::empty()))
                .collect()
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_custom_estimator_replaces_configured_one() {
        let source = MemorySource::builder()
            .loss("1", PATTERN.to_vec())
            .loss("2", PATTERN.to_vec())
            .build();
        let outcome = Pipeline::new(PipelineConfig::default())
            .unwrap()
            .with_estimator(Some(Box::new(FixedEstimator)))
            .run(&source)
            .unwrap();
        assert_eq!(outcome.capacity_model.as_deref(), Some("fixed"));
        assert!(outcome.capacity.get("Link_1").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.threshold = 2.0;
        assert!(matches!(
            Pipeline::new(config),
            Err(TopologyError::InvalidConfig(_))
        ));

        let mut config = PipelineConfig::default();
        config.estimator = EstimatorKind::Dual;
        config.dual_capture.buffer_margin = -1.0;
        assert!(Pipeline::new(config).is_err());
    }
}
