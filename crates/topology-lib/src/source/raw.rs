//! Raw capture directory source
//!
//! Reads `pkt-stats-cell-<id>.dat` files. Each line holds whitespace
//! separated `slot tx rx late` counters; lines with fewer than four fields
//! or non-integer counters are skipped.

use super::{TelemetrySource, SIGNAL_DU_THROUGHPUT, SIGNAL_RU_THROUGHPUT, SIGNAL_TRANSMIT};
use crate::error::SourceError;
use crate::models::{sort_cell_ids, CellId};
use crate::stats::normalize_to_unit_max;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// File name prefix of per-cell capture files
pub const RAW_FILE_PREFIX: &str = "pkt-stats-cell";

/// How per-slot loss counts become a fingerprint sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LossEncoding {
    /// 1.0 for any slot with loss, 0.0 otherwise
    #[default]
    Binary,
    /// Loss count scaled by the largest loss count of the series
    Magnitude,
}

/// Parsed counters of one capture file
#[derive(Debug, Clone, Default, PartialEq)]
struct CaptureCounters {
    tx: Vec<f64>,
    rx: Vec<f64>,
    /// `max(0, tx - rx + late)` per slot
    lost: Vec<f64>,
}

/// Telemetry backed by a directory of raw capture files
pub struct RawCaptureSource {
    dir: PathBuf,
    cells: Vec<CellId>,
    encoding: LossEncoding,
    cache: HashMap<CellId, OnceLock<CaptureCounters>>,
}

impl RawCaptureSource {
    /// Scan `dir` for capture files
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref().to_path_buf();
        let entries = std::fs::read_dir(&dir).map_err(|source| SourceError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut cells = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SourceError::Io {
                path: dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            if let Some(cell) = cell_id_from_file_name(&name.to_string_lossy()) {
                cells.push(cell);
            }
        }
        sort_cell_ids(&mut cells);
        cells.dedup();

        debug!(dir = %dir.display(), cells = cells.len(), "Scanned raw capture directory");

        let cache = cells
            .iter()
            .map(|c| (c.clone(), OnceLock::new()))
            .collect();
        Ok(Self {
            dir,
            cells,
            encoding: LossEncoding::default(),
            cache,
        })
    }

    pub fn with_loss_encoding(mut self, encoding: LossEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn path_for(&self, cell: &str) -> PathBuf {
        self.dir.join(format!("{}-{}.dat", RAW_FILE_PREFIX, cell))
    }

    fn counters(&self, cell: &str) -> Result<&CaptureCounters, SourceError> {
        let slot = self
            .cache
            .get(cell)
            .ok_or_else(|| SourceError::UnknownCell(cell.to_string()))?;
        if let Some(counters) = slot.get() {
            return Ok(counters);
        }

        let path = self.path_for(cell);
        let content = std::fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        let counters = parse_capture(&content);
        debug!(cell = %cell, slots = counters.tx.len(), "Parsed capture file");

        // A concurrent reader may have filled the slot first; both parses are identical.
        let _ = slot.set(counters);
        slot.get()
            .ok_or_else(|| SourceError::UnknownCell(cell.to_string()))
    }

    fn non_empty(
        series: &[f64],
        cell: &str,
        signal: &'static str,
    ) -> Result<Vec<f64>, SourceError> {
        if series.is_empty() {
            return Err(SourceError::SignalUnavailable {
                cell: cell.to_string(),
                signal,
            });
        }
        Ok(series.to_vec())
    }
}

impl TelemetrySource for RawCaptureSource {
    fn list_cells(&self) -> Result<Vec<CellId>, SourceError> {
        Ok(self.cells.clone())
    }

    fn loss_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        let counters = self.counters(cell)?;
        Ok(encode_loss(&counters.lost, self.encoding))
    }

    fn transmit_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        Self::non_empty(&self.counters(cell)?.tx, cell, SIGNAL_TRANSMIT)
    }

    fn du_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        Self::non_empty(&self.counters(cell)?.tx, cell, SIGNAL_DU_THROUGHPUT)
    }

    fn ru_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        Self::non_empty(&self.counters(cell)?.rx, cell, SIGNAL_RU_THROUGHPUT)
    }

    fn describe(&self) -> String {
        format!("raw:{}", self.dir.display())
    }
}

/// Extract the cell id from `pkt-stats-cell-<id>.dat`
fn cell_id_from_file_name(name: &str) -> Option<CellId> {
    let rest = name.strip_prefix(RAW_FILE_PREFIX)?.strip_prefix('-')?;
    let id = rest.strip_suffix(".dat")?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn parse_capture(content: &str) -> CaptureCounters {
    let mut counters = CaptureCounters::default();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        let (Ok(tx), Ok(rx), Ok(late)) = (
            parts[1].parse::<i64>(),
            parts[2].parse::<i64>(),
            parts[3].parse::<i64>(),
        ) else {
            continue;
        };

        // Counters too large to combine are treated like any other bad line
        let Some(lost) = tx.checked_sub(rx).and_then(|d| d.checked_add(late)) else {
            continue;
        };
        let lost = lost.max(0);
        counters.tx.push(tx.max(0) as f64);
        counters.rx.push(rx.max(0) as f64);
        counters.lost.push(lost as f64);
    }
    counters
}

fn encode_loss(lost: &[f64], encoding: LossEncoding) -> Vec<f64> {
    match encoding {
        LossEncoding::Binary => lost
            .iter()
            .map(|&l| if l > 0.0 { 1.0 } else { 0.0 })
            .collect(),
        LossEncoding::Magnitude => normalize_to_unit_max(lost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_capture(dir: &TempDir, cell: &str, content: &str) {
        let path = dir.path().join(format!("{}-{}.dat", RAW_FILE_PREFIX, cell));
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_cell_id_from_file_name() {
        assert_eq!(
            cell_id_from_file_name("pkt-stats-cell-12.dat"),
            Some("12".to_string())
        );
        assert_eq!(cell_id_from_file_name("pkt-stats-cell-.dat"), None);
        assert_eq!(cell_id_from_file_name("pkt-stats-cell-3.txt"), None);
        assert_eq!(cell_id_from_file_name("notes.dat"), None);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let counters = parse_capture("0 10 10 0\nheader line\n1 10 7 0\n2 x 1 0\n3 5 6 2\n");
        assert_eq!(counters.tx, vec![10.0, 10.0, 5.0]);
        assert_eq!(counters.rx, vec![10.0, 7.0, 6.0]);
        assert_eq!(counters.lost, vec![0.0, 3.0, 1.0]);
    }

    #[test]
    fn test_parse_skips_overflowing_counters() {
        let counters = parse_capture(
            "0 9223372036854775807 0 1\n1 -9223372036854775808 1 0\n2 10 8 0\n",
        );
        assert_eq!(counters.tx, vec![10.0]);
        assert_eq!(counters.lost, vec![2.0]);
    }

    #[test]
    fn test_loss_encodings() {
        let lost = vec![0.0, 3.0, 1.0, 0.0];
        assert_eq!(encode_loss(&lost, LossEncoding::Binary), vec![0.0, 1.0, 1.0, 0.0]);
        let magnitude = encode_loss(&lost, LossEncoding::Magnitude);
        assert_eq!(magnitude[1], 1.0);
        assert!((magnitude[2] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_lists_cells_in_numeric_order() {
        let dir = TempDir::new().unwrap();
        write_capture(&dir, "10", "0 1 1 0\n");
        write_capture(&dir, "2", "0 1 0 0\n");
        write_capture(&dir, "1", "0 1 1 0\n");
        std::fs::write(dir.path().join("README"), "ignore").unwrap();

        let source = RawCaptureSource::open(dir.path()).unwrap();
        assert_eq!(source.list_cells().unwrap(), vec!["1", "2", "10"]);
        assert_eq!(source.loss_series("2").unwrap(), vec![1.0]);
        assert_eq!(source.du_throughput_series("2").unwrap(), vec![1.0]);
        assert_eq!(source.ru_throughput_series("2").unwrap(), vec![0.0]);
    }

    #[test]
    fn test_empty_capture_has_no_rate_series() {
        let dir = TempDir::new().unwrap();
        write_capture(&dir, "4", "garbage\n");
        let source = RawCaptureSource::open(dir.path()).unwrap();
        assert!(source.loss_series("4").unwrap().is_empty());
        assert!(matches!(
            source.transmit_series("4"),
            Err(SourceError::SignalUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_directory() {
        let result = RawCaptureSource::open("/nonexistent/fronthaul/captures");
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }
}
