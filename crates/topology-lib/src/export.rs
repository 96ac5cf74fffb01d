//! Topology export
//!
//! Converts a [`PipelineOutcome`] into the JSON documents handed to
//! dashboards and other downstream consumers.

use crate::models::{CapacityReport, CellId};
use crate::pipeline::{PipelineOutcome, RunStatus};
use crate::stats::round3;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TOPOLOGY_FILE: &str = "topology.json";
pub const CELL_TO_LINK_FILE: &str = "cell_to_link.json";
pub const FINGERPRINTS_FILE: &str = "fingerprints.json";
pub const SIMILARITY_FILE: &str = "similarity_matrix.json";

/// One link entry of the export document
#[derive(Debug, Clone, Serialize)]
pub struct ExportedLink {
    pub id: String,
    pub cells: Vec<CellId>,
    pub confidence: f64,
    pub capacity: CapacityReport,
}

/// Export document describing an inferred topology
#[derive(Debug, Clone, Serialize)]
pub struct TopologyExport {
    pub generated_at: String,
    pub dataset: String,
    pub status: RunStatus,
    pub threshold: f64,
    pub cell_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_model: Option<String>,
    pub links: Vec<ExportedLink>,
    pub warnings: Vec<String>,
}

impl TopologyExport {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        let links = outcome
            .links
            .iter()
            .map(|(label, cells)| ExportedLink {
                id: label.to_string(),
                cells: cells.clone(),
                confidence: round3(outcome.confidences.get(label).copied().unwrap_or(0.0)),
                capacity: outcome
                    .capacity
                    .get(label)
                    .cloned()
                    .unwrap_or_else(CapacityReport::empty),
            })
            .collect();

        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            dataset: outcome.dataset.clone(),
            status: outcome.status,
            threshold: outcome.threshold,
            cell_count: outcome.cell_count,
            capacity_model: outcome.capacity_model.clone(),
            links,
            warnings: outcome.warnings.clone(),
        }
    }
}

/// Write every export artifact into `dir`, creating it if needed
///
/// Returns the paths written, in write order.
pub fn write_artifacts(outcome: &PipelineOutcome, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    write_json(dir, TOPOLOGY_FILE, &TopologyExport::from_outcome(outcome), &mut written)?;
    write_json(dir, CELL_TO_LINK_FILE, &outcome.links, &mut written)?;
    write_json(dir, FINGERPRINTS_FILE, &outcome.fingerprints, &mut written)?;
    if let Some(matrix) = &outcome.similarity {
        write_json(dir, SIMILARITY_FILE, matrix, &mut written)?;
    }

    info!(
        event = "artifacts_written",
        dir = %dir.display(),
        files = written.len(),
        "Wrote topology artifacts"
    );
    Ok(written)
}

fn write_json<T: Serialize>(
    dir: &Path,
    name: &str,
    value: &T,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let path = dir.join(name);
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", name))?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);
    Ok(())
}
