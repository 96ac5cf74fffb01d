//! Ethernet capacity estimation for inferred links
//!
//! Two interchangeable models share the [`CapacityEstimator`] trait:
//! - [`TransmitEstimator`]: mean transmit rate only (single capture point)
//! - [`DualCaptureEstimator`]: DU demand vs RU delivery with a congestion score

mod dual;
mod transmit;

pub use dual::{DualCaptureEstimator, CONGESTION_EPSILON, DEFAULT_DUAL_BUFFER_MARGIN, DEFAULT_SLOT_DURATION_US};
pub use transmit::{TransmitEstimator, DEFAULT_SLOT_DURATION_SECS, DEFAULT_TRANSMIT_BUFFER_MARGIN};

use crate::error::TopologyError;
use crate::models::{CapacityMap, LinkMap};
use crate::source::TelemetrySource;
use serde::{Deserialize, Serialize};

/// Ethernet MTU-sized packet assumed by both models
pub const DEFAULT_PACKET_SIZE_BYTES: u32 = 1500;

/// Trait for capacity estimation implementations
pub trait CapacityEstimator: Send + Sync {
    /// Estimate capacity for every link of the map; every label is present
    /// in the result, possibly with an empty report
    fn estimate(&self, links: &LinkMap, source: &dyn TelemetrySource) -> CapacityMap;

    /// Model name used in logs and exports
    fn name(&self) -> &'static str;
}

/// Selectable capacity model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Skip capacity estimation
    None,
    /// Single-capture transmit model
    #[default]
    Transmit,
    /// Dual-capture congestion model
    Dual,
}

/// Packet size in bits
pub(crate) fn packet_bits(packet_size_bytes: u32) -> f64 {
    packet_size_bytes as f64 * 8.0
}

/// Reject negative or non-finite margins
pub(crate) fn check_margin(margin: f64) -> Result<f64, TopologyError> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(TopologyError::InvalidConfig(format!(
            "buffer margin must be a non-negative number, got {}",
            margin
        )));
    }
    Ok(margin)
}

/// Reject zero, negative or non-finite slot durations
pub(crate) fn check_slot(duration: f64, unit: &str) -> Result<f64, TopologyError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(TopologyError::InvalidConfig(format!(
            "slot duration must be positive, got {} {}",
            duration, unit
        )));
    }
    Ok(duration)
}

pub(crate) fn check_packet_size(bytes: u32) -> Result<u32, TopologyError> {
    if bytes == 0 {
        return Err(TopologyError::InvalidConfig(
            "packet size must be at least one byte".to_string(),
        ));
    }
    Ok(bytes)
}
