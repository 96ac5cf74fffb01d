//! Pipeline configuration

use crate::capacity::{
    EstimatorKind, DEFAULT_DUAL_BUFFER_MARGIN, DEFAULT_PACKET_SIZE_BYTES,
    DEFAULT_SLOT_DURATION_SECS, DEFAULT_SLOT_DURATION_US, DEFAULT_TRANSMIT_BUFFER_MARGIN,
};
use crate::inference::{DEFAULT_SIMILARITY_THRESHOLD, MIN_OVERLAP_SAMPLES};
use crate::source::LossEncoding;
use serde::{Deserialize, Serialize};

/// Configuration for one inference run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Similarity above which two cells are linked (exclusive)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Minimum overlapping samples for a correlation to count
    #[serde(default = "default_min_overlap")]
    pub min_overlap_samples: usize,

    /// How raw loss counters are turned into fingerprints
    #[serde(default)]
    pub loss_encoding: LossEncoding,

    /// Capacity model to run after clustering
    #[serde(default)]
    pub estimator: EstimatorKind,

    #[serde(default)]
    pub transmit: TransmitConfig,

    #[serde(default)]
    pub dual_capture: DualCaptureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_overlap_samples: default_min_overlap(),
            loss_encoding: LossEncoding::default(),
            estimator: EstimatorKind::default(),
            transmit: TransmitConfig::default(),
            dual_capture: DualCaptureConfig::default(),
        }
    }
}

/// Single-capture (transmit) model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmitConfig {
    #[serde(default = "default_transmit_slot")]
    pub slot_duration_secs: f64,
    #[serde(default = "default_packet_size")]
    pub packet_size_bytes: u32,
    #[serde(default = "default_transmit_margin")]
    pub buffer_margin: f64,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            slot_duration_secs: default_transmit_slot(),
            packet_size_bytes: default_packet_size(),
            buffer_margin: default_transmit_margin(),
        }
    }
}

/// Dual-capture (DU/RU) model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualCaptureConfig {
    #[serde(default = "default_dual_slot")]
    pub slot_duration_us: f64,
    #[serde(default = "default_packet_size")]
    pub packet_size_bytes: u32,
    #[serde(default = "default_dual_margin")]
    pub buffer_margin: f64,
}

impl Default for DualCaptureConfig {
    fn default() -> Self {
        Self {
            slot_duration_us: default_dual_slot(),
            packet_size_bytes: default_packet_size(),
            buffer_margin: default_dual_margin(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_min_overlap() -> usize {
    MIN_OVERLAP_SAMPLES
}

fn default_packet_size() -> u32 {
    DEFAULT_PACKET_SIZE_BYTES
}

fn default_transmit_slot() -> f64 {
    DEFAULT_SLOT_DURATION_SECS
}

fn default_transmit_margin() -> f64 {
    DEFAULT_TRANSMIT_BUFFER_MARGIN
}

fn default_dual_slot() -> f64 {
    DEFAULT_SLOT_DURATION_US
}

fn default_dual_margin() -> f64 {
    DEFAULT_DUAL_BUFFER_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.min_overlap_samples, 5);
        assert_eq!(config.transmit.slot_duration_secs, 0.001);
        assert_eq!(config.transmit.buffer_margin, 0.20);
        assert_eq!(config.dual_capture.slot_duration_us, 143.0);
        assert_eq!(config.dual_capture.buffer_margin, 0.25);
        assert_eq!(config.dual_capture.packet_size_bytes, 1500);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{ "threshold": 0.8, "estimator": "dual", "dual_capture": { "buffer_margin": 0.3 } }"#,
        )
        .unwrap();
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.estimator, EstimatorKind::Dual);
        assert_eq!(config.dual_capture.buffer_margin, 0.3);
        assert_eq!(config.dual_capture.slot_duration_us, 143.0);
        assert_eq!(config.loss_encoding, LossEncoding::Binary);
    }
}
