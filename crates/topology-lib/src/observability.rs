//! Observability infrastructure for the inference pipeline
//!
//! Provides:
//! - Prometheus metrics (stage latency, cells analyzed, links inferred, congestion)
//! - Structured logging of pipeline events with tracing

use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter, register_int_gauge, Encoder,
    Gauge, HistogramVec, IntCounter, IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for stage latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PipelineMetricsInner> = OnceLock::new();

struct PipelineMetricsInner {
    stage_latency_seconds: HistogramVec,
    runs_total: IntCounter,
    cells_analyzed: IntGauge,
    empty_fingerprints: IntGauge,
    links_inferred: IntGauge,
    singleton_links: IntGauge,
    max_congestion_score: Gauge,
}

impl PipelineMetricsInner {
    fn new() -> Self {
        Self {
            stage_latency_seconds: register_histogram_vec!(
                "fronthaul_topology_stage_latency_seconds",
                "Time spent in each inference pipeline stage",
                &["stage"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register stage_latency_seconds"),

            runs_total: register_int_counter!(
                "fronthaul_topology_runs_total",
                "Total number of pipeline runs"
            )
            .expect("Failed to register runs_total"),

            cells_analyzed: register_int_gauge!(
                "fronthaul_topology_cells_analyzed",
                "Number of cells in the last analyzed snapshot"
            )
            .expect("Failed to register cells_analyzed"),

            empty_fingerprints: register_int_gauge!(
                "fronthaul_topology_empty_fingerprints",
                "Cells without any loss samples in the last run"
            )
            .expect("Failed to register empty_fingerprints"),

            links_inferred: register_int_gauge!(
                "fronthaul_topology_links_inferred",
                "Number of link groups inferred in the last run"
            )
            .expect("Failed to register links_inferred"),

            singleton_links: register_int_gauge!(
                "fronthaul_topology_singleton_links",
                "Number of single-cell link groups in the last run"
            )
            .expect("Failed to register singleton_links"),

            max_congestion_score: register_gauge!(
                "fronthaul_topology_max_congestion_score",
                "Highest per-link congestion score in the last dual-capture run"
            )
            .expect("Failed to register max_congestion_score"),
        }
    }
}

/// Pipeline metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct PipelineMetrics {
    _private: (),
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PipelineMetricsInner {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new)
    }

    pub fn observe_stage_latency(&self, stage: &str, duration_secs: f64) {
        self.inner()
            .stage_latency_seconds
            .with_label_values(&[stage])
            .observe(duration_secs);
    }

    pub fn inc_runs(&self) {
        self.inner().runs_total.inc();
    }

    pub fn set_cells_analyzed(&self, cells: i64, empty: i64) {
        self.inner().cells_analyzed.set(cells);
        self.inner().empty_fingerprints.set(empty);
    }

    pub fn set_links(&self, links: i64, singletons: i64) {
        self.inner().links_inferred.set(links);
        self.inner().singleton_links.set(singletons);
    }

    pub fn set_max_congestion(&self, score: f64) {
        self.inner().max_congestion_score.set(score);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for pipeline events
///
/// Every event carries the dataset description so logs from several runs
/// can be told apart.
#[derive(Clone)]
pub struct StructuredLogger {
    dataset: String,
}

impl StructuredLogger {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }

    pub fn log_run_started(&self, cells: usize, threshold: f64) {
        info!(
            event = "run_started",
            dataset = %self.dataset,
            cells = cells,
            threshold = threshold,
            "Topology inference started"
        );
    }

    pub fn log_insufficient_cells(&self, cells: usize, required: usize) {
        warn!(
            event = "insufficient_cells",
            dataset = %self.dataset,
            cells = cells,
            required = required,
            "Not enough cells to infer links, skipping clustering and capacity estimation"
        );
    }

    pub fn log_stage(&self, stage: &str, duration_secs: f64) {
        debug!(
            event = "stage_finished",
            dataset = %self.dataset,
            stage = %stage,
            duration_secs = duration_secs,
            "Pipeline stage finished"
        );
    }

    pub fn log_link(&self, label: &str, cells: &[String], confidence: f64) {
        info!(
            event = "link_inferred",
            dataset = %self.dataset,
            link = %label,
            cells = ?cells,
            confidence = confidence,
            "Inferred link"
        );
    }

    pub fn log_validation_warning(&self, warning: &str) {
        warn!(
            event = "validation_warning",
            dataset = %self.dataset,
            details = %warning,
            "Link validation warning"
        );
    }

    pub fn log_capacity(&self, label: &str, model: &str, safe_gbps: Option<f64>) {
        match safe_gbps {
            Some(safe) => info!(
                event = "capacity_estimated",
                dataset = %self.dataset,
                link = %label,
                model = %model,
                safe_gbps = safe,
                "Estimated link capacity"
            ),
            None => warn!(
                event = "capacity_unavailable",
                dataset = %self.dataset,
                link = %label,
                model = %model,
                "No usable rate data for link"
            ),
        }
    }

    pub fn log_run_finished(&self, links: usize, warnings: usize, duration_secs: f64) {
        info!(
            event = "run_finished",
            dataset = %self.dataset,
            links = links,
            warnings = warnings,
            duration_secs = duration_secs,
            "Topology inference finished"
        );
    }
}
