//! Error types for telemetry sources and the inference pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a telemetry source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Underlying file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content could not be decoded
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The cell is not known to this source
    #[error("unknown cell: {0}")]
    UnknownCell(String),

    /// The source does not carry this signal for the cell
    #[error("signal {signal} unavailable for cell {cell}")]
    SignalUnavailable { cell: String, signal: &'static str },
}

/// Failure of a pipeline run
#[derive(Error, Debug)]
pub enum TopologyError {
    /// The source could not enumerate its cells
    #[error("telemetry source failed: {0}")]
    Source(#[from] SourceError),

    /// A configuration value is outside its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
