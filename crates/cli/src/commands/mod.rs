//! CLI subcommands

pub mod infer;
pub mod matrix;

use crate::DataArgs;
use anyhow::{Context, Result};
use topology_lib::source::open_source;
use topology_lib::{PipelineConfig, TelemetrySource};

/// Open the telemetry source named on the command line
pub fn open_data(args: &DataArgs, config: &PipelineConfig) -> Result<Box<dyn TelemetrySource>> {
    open_source(args.source.into(), &args.data, config.loss_encoding)
        .with_context(|| format!("Failed to open telemetry at {}", args.data.display()))
}
