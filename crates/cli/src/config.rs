//! Configuration management for the CLI
//!
//! Settings are layered: the config file (explicit `--config` path, or
//! `~/.config/fhtopo/config.toml` when present), then `FHTOPO__*`
//! environment variables, then command-line flags.

use crate::{DataArgs, EstimatorArg};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use topology_lib::PipelineConfig;

const ENV_PREFIX: &str = "FHTOPO";

/// Load the pipeline configuration from file and environment
pub fn load(explicit: Option<&Path>) -> Result<PipelineConfig> {
    let mut builder = Config::builder();

    if let Some(path) = explicit {
        builder = builder.add_source(File::from(path).required(true));
    } else if let Some(path) = default_config_path().filter(|p| p.exists()) {
        builder = builder.add_source(File::from(path).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize::<PipelineConfig>()
        .context("Failed to parse configuration")
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(
    mut config: PipelineConfig,
    data: &DataArgs,
    estimator: Option<EstimatorArg>,
) -> PipelineConfig {
    if let Some(threshold) = data.threshold {
        config.threshold = threshold;
    }
    if let Some(encoding) = data.loss_encoding {
        config.loss_encoding = encoding.into();
    }
    if let Some(estimator) = estimator {
        config.estimator = estimator.into();
    }
    config
}

/// Get the default configuration file path
fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("fhtopo").join("config.toml"))
}
