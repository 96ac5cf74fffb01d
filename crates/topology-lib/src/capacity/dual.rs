//! Dual-capture capacity model
//!
//! Uses two capture points per cell:
//! - DU side: demand as transmitted, before congestion
//! - RU side: traffic actually delivered, after congestion
//!
//! All member series (DU and RU alike) are truncated to the shortest one
//! before per-slot summation, because congestion is computed from
//! differences at matching slots.

use super::{check_margin, check_packet_size, check_slot, packet_bits, CapacityEstimator};
use crate::config::DualCaptureConfig;
use crate::error::TopologyError;
use crate::models::{CapacityMap, CapacityReport, DualCaptureCapacity, LinkMap};
use crate::source::{series_or_empty, TelemetrySource, SIGNAL_DU_THROUGHPUT, SIGNAL_RU_THROUGHPUT};
use crate::stats::{mean, round3};
use tracing::debug;

/// Default slot duration of the dual-capture model (143 µs)
pub const DEFAULT_SLOT_DURATION_US: f64 = 143.0;

/// Default safety margin of the dual-capture model (25%)
pub const DEFAULT_DUAL_BUFFER_MARGIN: f64 = 0.25;

/// Guards the per-slot congestion ratio against zero demand
pub const CONGESTION_EPSILON: f64 = 1e-9;

/// Estimates link capacity and congestion from DU/RU captures
#[derive(Debug, Clone)]
pub struct DualCaptureEstimator {
    packet_bits: f64,
    slot_duration_us: f64,
    buffer_margin: f64,
}

impl DualCaptureEstimator {
    pub fn new(config: &DualCaptureConfig) -> Result<Self, TopologyError> {
        Ok(Self {
            packet_bits: packet_bits(check_packet_size(config.packet_size_bytes)?),
            slot_duration_us: check_slot(config.slot_duration_us, "us")?,
            buffer_margin: check_margin(config.buffer_margin)?,
        })
    }

    pub fn buffer_margin(&self) -> f64 {
        self.buffer_margin
    }

    /// Convert packets per slot into Gbps
    pub fn series_to_gbps(&self, packets: &[f64]) -> Vec<f64> {
        let slot_seconds = self.slot_duration_us / 1_000_000.0;
        packets
            .iter()
            .map(|p| p * self.packet_bits / slot_seconds / 1e9)
            .collect()
    }

    /// Capacity report for one link's member cells
    pub fn estimate_link(&self, cells: &[String], source: &dyn TelemetrySource) -> CapacityReport {
        if cells.is_empty() {
            return CapacityReport::empty();
        }

        let mut du_all = Vec::with_capacity(cells.len());
        let mut ru_all = Vec::with_capacity(cells.len());
        for cell in cells {
            du_all.push(series_or_empty(
                source.du_throughput_series(cell),
                cell,
                SIGNAL_DU_THROUGHPUT,
            ));
            ru_all.push(series_or_empty(
                source.ru_throughput_series(cell),
                cell,
                SIGNAL_RU_THROUGHPUT,
            ));
        }

        let aligned = du_all
            .iter()
            .chain(&ru_all)
            .map(Vec::len)
            .min()
            .unwrap_or(0);
        if aligned == 0 {
            return CapacityReport::empty();
        }

        let du_gbps = self.series_to_gbps(&sum_aligned(&du_all, aligned));
        let ru_gbps = self.series_to_gbps(&sum_aligned(&ru_all, aligned));

        let peak_demand = du_gbps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let average_demand = mean(&du_gbps);
        let congestion = congestion_score(&du_gbps, &ru_gbps);
        let safe_capacity = peak_demand * (1.0 + self.buffer_margin);

        CapacityReport::DualCapture(DualCaptureCapacity {
            peak_demand_gbps: round3(peak_demand),
            average_demand_gbps: round3(average_demand),
            safe_capacity_gbps: round3(safe_capacity),
            congestion_score: round3(congestion),
            buffer_margin: self.buffer_margin,
            aligned_slots: aligned,
        })
    }
}

impl Default for DualCaptureEstimator {
    fn default() -> Self {
        Self {
            packet_bits: packet_bits(super::DEFAULT_PACKET_SIZE_BYTES),
            slot_duration_us: DEFAULT_SLOT_DURATION_US,
            buffer_margin: DEFAULT_DUAL_BUFFER_MARGIN,
        }
    }
}

impl CapacityEstimator for DualCaptureEstimator {
    fn estimate(&self, links: &LinkMap, source: &dyn TelemetrySource) -> CapacityMap {
        links
            .iter()
            .map(|(label, cells)| {
                let report = self.estimate_link(cells, source);
                match &report {
                    CapacityReport::DualCapture(r) => debug!(
                        link = %label,
                        peak_demand_gbps = r.peak_demand_gbps,
                        congestion_score = r.congestion_score,
                        aligned_slots = r.aligned_slots,
                        "Estimated dual-capture capacity"
                    ),
                    _ => debug!(link = %label, "No aligned DU/RU data for link"),
                }
                (label, report)
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "dual"
    }
}

/// Per-slot sum of the first `len` samples of every series
fn sum_aligned(series: &[Vec<f64>], len: usize) -> Vec<f64> {
    let mut sum = vec![0.0; len];
    for s in series {
        for (acc, v) in sum.iter_mut().zip(&s[..len]) {
            *acc += v;
        }
    }
    sum
}

/// Mean per-slot fraction of demand not delivered, each slot clamped to [0, 1]
///
/// Over-delivery (RU above DU) counts as zero for that slot.
pub(crate) fn congestion_score(du: &[f64], ru: &[f64]) -> f64 {
    let ratios: Vec<f64> = du
        .iter()
        .zip(ru)
        .map(|(d, r)| {
            let ratio = (d - r) / (d + CONGESTION_EPSILON);
            if ratio.is_nan() {
                0.0
            } else {
                ratio.clamp(0.0, 1.0)
            }
        })
        .collect();
    mean(&ratios)
}
