//! Telemetry sources
//!
//! This module defines the data-retrieval surface the inference pipeline
//! depends on, plus the concrete sources shipped with the crate:
//! raw `pkt-stats-cell-<id>.dat` capture directories, JSON snapshots and an
//! in-memory source. All series are index-aligned per capture session.

mod memory;
mod raw;
mod snapshot;

pub use memory::{MemorySource, MemorySourceBuilder};
pub use raw::{LossEncoding, RawCaptureSource, RAW_FILE_PREFIX};
pub use snapshot::{SnapshotCell, SnapshotSource};

use crate::error::SourceError;
use crate::models::CellId;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SIGNAL_LOSS: &str = "loss";
pub const SIGNAL_TRANSMIT: &str = "transmit";
pub const SIGNAL_DU_THROUGHPUT: &str = "du_throughput";
pub const SIGNAL_RU_THROUGHPUT: &str = "ru_throughput";

/// Trait for telemetry source implementations
pub trait TelemetrySource: Send + Sync {
    /// Ordered list of cell identifiers, stable across calls
    fn list_cells(&self) -> Result<Vec<CellId>, SourceError>;

    /// Loss series normalized so its maximum (if any) is 1.0
    fn loss_series(&self, cell: &str) -> Result<Vec<f64>, SourceError>;

    /// Transmitted packets per time slot
    fn transmit_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        Err(SourceError::SignalUnavailable {
            cell: cell.to_string(),
            signal: SIGNAL_TRANSMIT,
        })
    }

    /// DU-side (before congestion) packets per time slot
    fn du_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        Err(SourceError::SignalUnavailable {
            cell: cell.to_string(),
            signal: SIGNAL_DU_THROUGHPUT,
        })
    }

    /// RU-side (delivered) packets per time slot
    fn ru_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        Err(SourceError::SignalUnavailable {
            cell: cell.to_string(),
            signal: SIGNAL_RU_THROUGHPUT,
        })
    }

    /// Short human-readable description used in exports
    fn describe(&self) -> String {
        "telemetry".to_string()
    }
}

/// Fetch a series, degrading any per-cell failure to an empty series
///
/// Per-cell data problems never abort a run; they are logged and the cell
/// keeps an empty series so downstream defaults apply.
pub(crate) fn series_or_empty(
    result: Result<Vec<f64>, SourceError>,
    cell: &str,
    signal: &'static str,
) -> Vec<f64> {
    match result {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(
                event = "series_unavailable",
                cell = %cell,
                signal = signal,
                error = %e,
                "Series unavailable, using empty series"
            );
            Vec::new()
        }
    }
}

/// Kind of on-disk telemetry source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Directory of `pkt-stats-cell-<id>.dat` captures
    #[default]
    Raw,
    /// JSON snapshot file
    Snapshot,
}

/// Open a file-backed source of the given kind
pub fn open_source(
    kind: SourceKind,
    path: &Path,
    loss_encoding: LossEncoding,
) -> Result<Box<dyn TelemetrySource>, SourceError> {
    match kind {
        SourceKind::Raw => {
            tracing::info!(path = %path.display(), "Using raw capture directory source");
            Ok(Box::new(
                RawCaptureSource::open(path)?.with_loss_encoding(loss_encoding),
            ))
        }
        SourceKind::Snapshot => {
            tracing::info!(path = %path.display(), "Using JSON snapshot source");
            Ok(Box::new(SnapshotSource::load(path)?))
        }
    }
}
