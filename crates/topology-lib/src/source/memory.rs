//! In-memory telemetry source

use super::{
    TelemetrySource, SIGNAL_DU_THROUGHPUT, SIGNAL_LOSS, SIGNAL_RU_THROUGHPUT, SIGNAL_TRANSMIT,
};
use crate::error::SourceError;
use crate::models::CellId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct CellSeries {
    loss: Option<Vec<f64>>,
    transmit: Option<Vec<f64>>,
    du: Option<Vec<f64>>,
    ru: Option<Vec<f64>>,
}

/// Telemetry held in memory, cells listed in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    order: Vec<CellId>,
    cells: HashMap<CellId, CellSeries>,
}

impl MemorySource {
    pub fn builder() -> MemorySourceBuilder {
        MemorySourceBuilder::default()
    }

    fn signal(
        &self,
        cell: &str,
        signal: &'static str,
        pick: impl Fn(&CellSeries) -> Option<&Vec<f64>>,
    ) -> Result<Vec<f64>, SourceError> {
        let series = self
            .cells
            .get(cell)
            .ok_or_else(|| SourceError::UnknownCell(cell.to_string()))?;
        pick(series)
            .cloned()
            .ok_or_else(|| SourceError::SignalUnavailable {
                cell: cell.to_string(),
                signal,
            })
    }
}

impl TelemetrySource for MemorySource {
    fn list_cells(&self) -> Result<Vec<CellId>, SourceError> {
        Ok(self.order.clone())
    }

    fn loss_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_LOSS, |s| s.loss.as_ref())
    }

    fn transmit_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_TRANSMIT, |s| s.transmit.as_ref())
    }

    fn du_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_DU_THROUGHPUT, |s| s.du.as_ref())
    }

    fn ru_throughput_series(&self, cell: &str) -> Result<Vec<f64>, SourceError> {
        self.signal(cell, SIGNAL_RU_THROUGHPUT, |s| s.ru.as_ref())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Builder for [`MemorySource`]
///
/// Loss series are stored as given; callers are expected to pass already
/// normalized values.
#[derive(Debug, Default)]
pub struct MemorySourceBuilder {
    source: MemorySource,
}

impl MemorySourceBuilder {
    fn entry(&mut self, cell: &str) -> &mut CellSeries {
        if !self.source.cells.contains_key(cell) {
            self.source.order.push(cell.to_string());
        }
        self.source.cells.entry(cell.to_string()).or_default()
    }

    /// Register a cell without any series
    pub fn cell(mut self, cell: &str) -> Self {
        self.entry(cell);
        self
    }

    pub fn loss(mut self, cell: &str, series: Vec<f64>) -> Self {
        self.entry(cell).loss = Some(series);
        self
    }

    pub fn transmit(mut self, cell: &str, series: Vec<f64>) -> Self {
        self.entry(cell).transmit = Some(series);
        self
    }

    pub fn du(mut self, cell: &str, series: Vec<f64>) -> Self {
        self.entry(cell).du = Some(series);
        self
    }

    pub fn ru(mut self, cell: &str, series: Vec<f64>) -> Self {
        self.entry(cell).ru = Some(series);
        self
    }

    pub fn build(self) -> MemorySource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_listed_in_insertion_order() {
        let source = MemorySource::builder()
            .loss("7", vec![0.0, 1.0])
            .transmit("3", vec![5.0])
            .loss("3", vec![1.0])
            .cell("1")
            .build();
        assert_eq!(source.list_cells().unwrap(), vec!["7", "3", "1"]);
    }

    #[test]
    fn test_missing_signal_and_unknown_cell() {
        let source = MemorySource::builder().loss("1", vec![1.0]).build();
        assert!(matches!(
            source.transmit_series("1"),
            Err(SourceError::SignalUnavailable { signal: "transmit", .. })
        ));
        assert!(matches!(
            source.loss_series("9"),
            Err(SourceError::UnknownCell(_))
        ));
    }
}
