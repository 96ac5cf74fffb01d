//! JSON snapshot source
//!
//! A snapshot is a single JSON document:
//!
//! ```json
//! { "cells": [ { "id": "1", "loss": [0, 1], "transmit": [10, 12], "du": [10, 12], "ru": [10, 9] } ] }
//! ```
//!
//! Every array is optional; a missing array means the signal is unavailable
//! for that cell. Loss values are normalized to a maximum of 1.0 on load.

use super::{
    TelemetrySource, SIGNAL_DU_THROUGHPUT, SIGNAL_LOSS, SIGNAL_RU_THROUGHPUT, SIGNAL_TRANSMIT,
};
use crate::error::SourceError;
use crate::models::CellId;
use crate::stats::normalize_to_unit_max;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One cell entry of a snapshot document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCell {
    pub id: CellId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmit: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub du: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    cells: Vec<SnapshotCell>,
}

/// Telemetry loaded from a JSON snapshot, cells in document order
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
    cells: Vec<SnapshotCell>,
}

impl SnapshotSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    pub fn from_json(content: &str, path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let document: SnapshotDocument =
            serde_json::from_str(content).map_err(|e| SourceError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let mut cells: Vec<SnapshotCell> = Vec::with_capacity(document.cells.len());
        for mut cell in document.cells {
            if cells.iter().any(|c| c.id == cell.id) {
                return Err(SourceError::Parse {
                    path,
                    reason: format!("duplicate cell id '{}'", cell.id),
                });
            }
            cell.loss = cell.loss.map(|l| normalize_to_unit_max(&l));
            cells.push(cell);
        }

        Ok(Self { path, cells })
    }

    fn find(&self, cell: &str) -> Result<&SnapshotCell, SourceError> {
        self.cells
            .iter()
            .find(|c| c.id == cell)
            .ok_or_else(|| SourceError::UnknownCell(cell.to_string()))
    }

    fn signal(
        &self,
        cell: &str,
        signal: &'static str,
        pick: impl Fn(&SnapshotCell) -> Option<&Vec<f64>>,
    ) -> Result<Vec<f64>, SourceError> {
        pick(self.find(cell)?)
            .cloned()
            .ok_or_else(|| SourceError::SignalUnavailable {
                cell: cell.to_string(),
                signal,
            })
    }
}

impl TelemetrySource for SnapshotSource {
    fn list_cells(&self) -> Result<Vec<CellId>, SourceError> {
        Ok(self.cells.iter().map(|c| c.id.clone()).collect())
    }

    fn loss_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_LOSS, |c| c.loss.as_ref())
    }

    fn transmit_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_TRANSMIT, |c| c.transmit.as_ref())
    }

    fn du_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_DU_THROUGHPUT, |c| c.du.as_ref())
    }

    fn ru_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_RU_THROUGHPUT, |c| c.ru.as_ref())
    }

    fn describe(&self) -> String {
        format!("snapshot:{}", self.path.display())
    }
}
