//! Command-line parsing for the curve mapper.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! matching engine. `app` turns these structs into a `RunConfig`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::PoolPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cmap", version, about = "Map training curves and test points onto ideal functions")]
pub struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match training curves to ideal functions, then map the test points.
    Run(RunArgs),
    /// Re-render charts from a saved `results.json`.
    Plot(PlotArgs),
    /// Write a synthetic train / ideal / test dataset.
    Generate(GenerateArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Directory holding `train.csv`, `ideal.csv` and `test.csv`.
    #[arg(long, env = "CMAP_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Training curves (wide CSV: x, y1, y2, ...).
    #[arg(long, value_name = "CSV")]
    pub train: Option<PathBuf>,

    /// Ideal (candidate) functions (wide CSV: x, y1, ..., yN).
    #[arg(long, value_name = "CSV")]
    pub ideal: Option<PathBuf>,

    /// Test points (CSV: x, y).
    #[arg(long, value_name = "CSV")]
    pub test: Option<PathBuf>,

    /// Column-name prefix selecting curve columns.
    #[arg(long, default_value = "y")]
    pub prefix: String,

    /// Whether training curves may share a chosen ideal function.
    #[arg(long, value_enum, default_value_t = PoolPolicy::Shared)]
    pub policy: PoolPolicy,

    /// Write fits.csv, mapped_test_data.csv and results.json here.
    #[arg(long, env = "CMAP_OUT_DIR", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Also write best_fit.svg and mapping.svg into the output directory.
    #[arg(long)]
    pub svg: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for plotting a saved run.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Results JSON written by `cmap run --out-dir`.
    #[arg(long, value_name = "JSON")]
    pub results: PathBuf,

    /// Write best_fit.svg and mapping.svg here instead of printing an ASCII plot.
    #[arg(long, value_name = "DIR")]
    pub svg_dir: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of ideal functions in the pool.
    #[arg(long, default_value_t = 50)]
    pub candidates: usize,

    /// Number of training curves (planted candidates).
    #[arg(long, default_value_t = 4)]
    pub training: usize,

    #[arg(long, default_value_t = 100)]
    pub test_points: usize,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,

    /// Fraction of test points generated as outliers.
    #[arg(long, default_value_t = 0.1)]
    pub outliers: f64,
}
