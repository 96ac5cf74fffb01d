//! Fronthaul Topology CLI
//!
//! A command-line tool for inferring Ethernet link groupings of fronthaul
//! cells from loss telemetry and sizing the capacity of each link.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::{infer, matrix};
use std::path::PathBuf;
use topology_lib::capacity::EstimatorKind;
use topology_lib::source::{LossEncoding, SourceKind};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Fronthaul Topology Inference CLI
#[derive(Parser)]
#[command(name = "fhtopo")]
#[command(author, version, about = "CLI for Fronthaul Topology Inference", long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (TOML or JSON)
    #[arg(long, env = "FHTOPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose (debug) logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer link groups, confidence and capacity
    Infer(InferArgs),

    /// Show the pairwise similarity matrix
    Matrix(DataArgs),
}

/// Where telemetry is read from
#[derive(Args, Clone)]
pub struct DataArgs {
    /// Capture directory (raw) or snapshot file (snapshot)
    #[arg(long, short)]
    pub data: PathBuf,

    /// Kind of telemetry source
    #[arg(long, default_value = "raw")]
    pub source: SourceArg,

    /// How raw loss counters become fingerprints
    #[arg(long)]
    pub loss_encoding: Option<LossEncodingArg>,

    /// Similarity threshold for linking cells (exclusive)
    #[arg(long, short)]
    pub threshold: Option<f64>,
}

#[derive(Args, Clone)]
pub struct InferArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Capacity model to run
    #[arg(long, short)]
    pub estimator: Option<EstimatorArg>,

    /// Directory to write topology artifacts into
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// File to write Prometheus metrics into after the run
    #[arg(long)]
    pub metrics: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    /// Directory of pkt-stats-cell-<id>.dat files
    Raw,
    /// JSON snapshot file
    Snapshot,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Raw => SourceKind::Raw,
            SourceArg::Snapshot => SourceKind::Snapshot,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LossEncodingArg {
    /// 1 for any slot with loss, 0 otherwise
    Binary,
    /// Loss count scaled to the largest loss of the cell
    Magnitude,
}

impl From<LossEncodingArg> for LossEncoding {
    fn from(arg: LossEncodingArg) -> Self {
        match arg {
            LossEncodingArg::Binary => LossEncoding::Binary,
            LossEncodingArg::Magnitude => LossEncoding::Magnitude,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EstimatorArg {
    /// Skip capacity estimation
    None,
    /// Single-capture transmit model
    Transmit,
    /// Dual-capture DU/RU congestion model
    Dual,
}

impl From<EstimatorArg> for EstimatorKind {
    fn from(arg: EstimatorArg) -> Self {
        match arg {
            EstimatorArg::None => EstimatorKind::None,
            EstimatorArg::Transmit => EstimatorKind::Transmit,
            EstimatorArg::Dual => EstimatorKind::Dual,
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let base = config::load(cli.config.as_deref())?;
    tracing::debug!(config = ?base, "Loaded pipeline configuration");

    match cli.command {
        Commands::Infer(args) => {
            let pipeline_config = config::apply_overrides(base, &args.data, args.estimator);
            infer::run(&args, pipeline_config, cli.format)?;
        }
        Commands::Matrix(args) => {
            let pipeline_config = config::apply_overrides(base, &args, None);
            matrix::run(&args, pipeline_config, cli.format)?;
        }
    }

    Ok(())
}
