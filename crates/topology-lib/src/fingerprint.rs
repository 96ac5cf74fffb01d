//! Loss fingerprint construction
//!
//! A fingerprint is the normalized loss series of one cell. The builder
//! pulls one per listed cell; cells whose series cannot be read keep an
//! empty fingerprint rather than being dropped.

use crate::error::SourceError;
use crate::models::CellId;
use crate::source::{series_or_empty, TelemetrySource, SIGNAL_LOSS};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping from cell identifier to loss fingerprint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fingerprints {
    cells: Vec<CellId>,
    series: Vec<Vec<f64>>,
}

impl Fingerprints {
    /// Build from explicit `(cell, series)` pairs, keeping their order
    ///
    /// A repeated cell identifier keeps its first position and takes the
    /// last series given for it.
    pub fn from_pairs<I, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<f64>)>,
        C: Into<CellId>,
    {
        let mut fingerprints = Self::default();
        for (cell, series) in pairs {
            let cell = cell.into();
            match fingerprints.cells.iter().position(|c| *c == cell) {
                Some(idx) => fingerprints.series[idx] = series,
                None => {
                    fingerprints.cells.push(cell);
                    fingerprints.series.push(series);
                }
            }
        }
        fingerprints
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn get(&self, cell: &str) -> Option<&[f64]> {
        self.cells
            .iter()
            .position(|c| c == cell)
            .map(|idx| self.series[idx].as_slice())
    }

    pub fn series_at(&self, idx: usize) -> &[f64] {
        &self.series[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.cells
            .iter()
            .zip(&self.series)
            .map(|(c, s)| (c.as_str(), s.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells with an empty fingerprint
    pub fn empty_count(&self) -> usize {
        self.series.iter().filter(|s| s.is_empty()).count()
    }
}

/// Serializes as a JSON object keyed by cell, in cell order
impl Serialize for Fingerprints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (cell, series) in self.iter() {
            map.serialize_entry(cell, series)?;
        }
        map.end()
    }
}

/// Builds loss fingerprints from a telemetry source
pub struct FingerprintBuilder<'a> {
    source: &'a dyn TelemetrySource,
}

impl<'a> FingerprintBuilder<'a> {
    pub fn new(source: &'a dyn TelemetrySource) -> Self {
        Self { source }
    }

    /// Build fingerprints for every cell the source lists
    pub fn build(&self) -> Result<Fingerprints, SourceError> {
        let cells = self.source.list_cells()?;
        Ok(self.build_for(&cells))
    }

    /// Build fingerprints for an already listed set of cells
    pub fn build_for(&self, cells: &[CellId]) -> Fingerprints {
        Fingerprints::from_pairs(cells.iter().map(|cell| {
            let series = series_or_empty(self.source.loss_series(cell), cell, SIGNAL_LOSS);
            (cell.clone(), series)
        }))
    }
}
