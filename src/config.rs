//! Run configuration: JSON file defaults overridden by command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::matching::{DeviationScope, MatchConfig};
use crate::sink::OutputFormat;

/// Settings for one run of the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub train: PathBuf,
    pub ideal: PathBuf,
    pub test: PathBuf,
    /// Directory receiving result tables and `summary.json`.
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    pub matching: MatchConfig,
    /// Open the egui viewer after the run.
    pub show_viewer: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            train: PathBuf::from("Data/train.csv"),
            ideal: PathBuf::from("Data/ideal.csv"),
            test: PathBuf::from("Data/test.csv"),
            output_dir: PathBuf::from("output"),
            output_format: OutputFormat::Csv,
            matching: MatchConfig::default(),
            show_viewer: true,
        }
    }
}

impl RunConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let factor = self.matching.threshold_factor;
        ensure!(
            factor.is_finite() && factor >= 0.0,
            "threshold factor must be a non-negative number, got {factor}"
        );
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(name = "ideal-fit")]
#[command(about = "Select ideal functions by least squares and map test points to them", long_about = None)]
pub struct CliArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Training data (CSV, JSON or Parquet)
    #[arg(long)]
    pub train: Option<PathBuf>,

    /// Ideal function catalog
    #[arg(long)]
    pub ideal: Option<PathBuf>,

    /// Test points
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// Directory for result tables
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Result table format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Bound each pair by its own training deviation instead of the candidate's
    #[arg(long)]
    pub strict: bool,

    /// Multiplier on the maximum deviation (default √2)
    #[arg(long)]
    pub threshold_factor: Option<f64>,

    /// Skip the viewer window
    #[arg(long)]
    pub no_gui: bool,
}

impl CliArgs {
    /// Merge the optional config file with the flags.
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(p) = &self.train {
            config.train = p.clone();
        }
        if let Some(p) = &self.ideal {
            config.ideal = p.clone();
        }
        if let Some(p) = &self.test {
            config.test = p.clone();
        }
        if let Some(p) = &self.out {
            config.output_dir = p.clone();
        }
        if let Some(f) = self.format {
            config.output_format = f;
        }
        if self.strict {
            config.matching.deviation_scope = DeviationScope::PerTraining;
        }
        if let Some(factor) = self.threshold_factor {
            config.matching.threshold_factor = factor;
        }
        if self.no_gui {
            config.show_viewer = false;
        }

        config.validate()?;
        Ok(config)
    }
}
