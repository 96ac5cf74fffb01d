//! Single-capture capacity model
//!
//! Sums the mean transmit rate (packets per slot) of every member cell and
//! converts it to bits per second:
//! `bps = packets_per_slot × (1 / slot_seconds) × packet_bits`.

use super::{check_margin, check_packet_size, check_slot, packet_bits, CapacityEstimator};
use crate::config::TransmitConfig;
use crate::error::TopologyError;
use crate::models::{CapacityMap, CapacityReport, LinkMap, TransmitCapacity};
use crate::source::{series_or_empty, TelemetrySource, SIGNAL_TRANSMIT};
use crate::stats::{mean, round3};
use tracing::debug;

/// Default slot duration of the transmit model (1 ms)
pub const DEFAULT_SLOT_DURATION_SECS: f64 = 0.001;

/// Default safety margin of the transmit model (20%)
pub const DEFAULT_TRANSMIT_BUFFER_MARGIN: f64 = 0.20;

/// Estimates link capacity from transmit rates only
#[derive(Debug, Clone)]
pub struct TransmitEstimator {
    packet_bits: f64,
    slot_duration_secs: f64,
    buffer_margin: f64,
}

impl TransmitEstimator {
    pub fn new(config: &TransmitConfig) -> Result<Self, TopologyError> {
        Ok(Self {
            packet_bits: packet_bits(check_packet_size(config.packet_size_bytes)?),
            slot_duration_secs: check_slot(config.slot_duration_secs, "s")?,
            buffer_margin: check_margin(config.buffer_margin)?,
        })
    }

    pub fn buffer_margin(&self) -> f64 {
        self.buffer_margin
    }

    /// Capacity report for one link's member cells
    pub fn estimate_link(&self, cells: &[String], source: &dyn TelemetrySource) -> TransmitCapacity {
        let mut packets_per_slot = 0.0;
        let mut cells_with_data = 0;

        for cell in cells {
            let series = series_or_empty(source.transmit_series(cell), cell, SIGNAL_TRANSMIT);
            if !series.is_empty() {
                packets_per_slot += mean(&series);
                cells_with_data += 1;
            }
        }

        let slots_per_second = 1.0 / self.slot_duration_secs;
        let bits_per_second = packets_per_slot * slots_per_second * self.packet_bits;
        let gbps = bits_per_second / 1e9;
        let safe_gbps = gbps * (1.0 + self.buffer_margin);

        TransmitCapacity {
            estimated_gbps: round3(gbps),
            safe_gbps: round3(safe_gbps),
            buffer_margin: self.buffer_margin,
            cells_with_data,
        }
    }
}

impl Default for TransmitEstimator {
    fn default() -> Self {
        Self {
            packet_bits: packet_bits(super::DEFAULT_PACKET_SIZE_BYTES),
            slot_duration_secs: DEFAULT_SLOT_DURATION_SECS,
            buffer_margin: DEFAULT_TRANSMIT_BUFFER_MARGIN,
        }
    }
}

impl CapacityEstimator for TransmitEstimator {
    fn estimate(&self, links: &LinkMap, source: &dyn TelemetrySource) -> CapacityMap {
        links
            .iter()
            .map(|(label, cells)| {
                let report = self.estimate_link(cells, source);
                debug!(
                    link = %label,
                    estimated_gbps = report.estimated_gbps,
                    safe_gbps = report.safe_gbps,
                    "Estimated transmit capacity"
                );
                (label, CapacityReport::Transmit(report))
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "transmit"
    }
}
