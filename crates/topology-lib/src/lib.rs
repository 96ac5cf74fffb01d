//! Fronthaul topology inference library
//!
//! This crate provides the core functionality for:
//! - Reading per-cell loss and throughput telemetry through pluggable sources
//! - Building loss fingerprints and pairwise similarity matrices
//! - Clustering cells into inferred Ethernet links and scoring them
//! - Estimating required link capacity (transmit and dual-capture models)
//! - Structured logging, pipeline metrics and topology export

pub mod capacity;
pub mod config;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod inference;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod source;
pub mod stats;

pub use config::{DualCaptureConfig, PipelineConfig, TransmitConfig};
pub use error::{SourceError, TopologyError};
pub use models::*;
pub use observability::{PipelineMetrics, StructuredLogger};
pub use pipeline::{Pipeline, PipelineOutcome, RunStatus};
pub use source::TelemetrySource;
