//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - runs the mapping pipeline and prints reports/plots
//! - writes the output files

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, GenerateArgs, PlotArgs, RunArgs};
use crate::data::SampleConfig;
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::plot::PlotData;

pub mod pipeline;

/// Rows of the assignment table printed by `cmap run`.
const ASSIGNMENT_ROWS_SHOWN: usize = 20;

/// Entry point for the `cmap` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be loaded before parsing so clap's `env =` fallbacks see it.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Plot(args) => handle_plot(args),
        Command::Generate(args) => handle_generate(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let output = pipeline::run_mapping(&config)?;

    println!("{}", crate::report::format_run_summary(&output, &config));
    println!(
        "{}",
        crate::report::format_assignments(&output.results.assignments, Some(ASSIGNMENT_ROWS_SHOWN))
    );

    if config.plot {
        let data = PlotData::from_results(&output.results);
        println!(
            "{}",
            crate::plot::render_ascii_plot(&data, config.plot_width, config.plot_height)
        );
    }

    for path in pipeline::write_outputs(&config, &output)? {
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let results = crate::io::read_results_json(&args.results)?;

    match &args.svg_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;
            for path in crate::plot::write_svg_charts(dir, &results)? {
                println!("wrote {}", path.display());
            }
        }
        None => {
            let data = PlotData::from_results(&results);
            println!("{}", crate::plot::render_ascii_plot(&data, args.width, args.height));
        }
    }

    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        seed: args.seed,
        n_candidates: args.candidates,
        n_training: args.training,
        n_test: args.test_points,
        noise_sd: args.noise,
        outlier_fraction: args.outliers,
        ..SampleConfig::default()
    };

    let dataset = crate::data::generate_dataset(&config)?;
    crate::data::write_dataset(&args.out_dir, &dataset)?;

    for (training, candidate) in &dataset.planted {
        info!(%training, %candidate, "planted");
    }
    println!("wrote train.csv, ideal.csv, test.csv to {}", args.out_dir.display());
    Ok(())
}

/// Build a `RunConfig` from `cmap run` flags.
///
/// Explicit `--train/--ideal/--test` paths win over `--data-dir`.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let resolve = |explicit: &Option<PathBuf>, file: &str, flag: &str| -> Result<PathBuf, AppError> {
        match (explicit, &args.data_dir) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(dir)) => Ok(dir.join(file)),
            (None, None) => Err(AppError::new(
                2,
                format!("Missing input: pass --{flag} or --data-dir (or set CMAP_DATA_DIR)."),
            )),
        }
    };

    if args.svg && args.out_dir.is_none() {
        return Err(AppError::new(2, "--svg needs --out-dir (or CMAP_OUT_DIR)."));
    }

    Ok(RunConfig {
        train_path: resolve(&args.train, "train.csv", "train")?,
        ideal_path: resolve(&args.ideal, "ideal.csv", "ideal")?,
        test_path: resolve(&args.test, "test.csv", "test")?,
        column_prefix: args.prefix.clone(),
        policy: args.policy,
        out_dir: args.out_dir.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg: args.svg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::parse_from(std::iter::once("cmap").chain(std::iter::once("run")).chain(argv.iter().copied()));
        match cli.command {
            Command::Run(args) => args,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn data_dir_fills_missing_paths() {
        let mut args = run_args(&["--test", "other/points.csv", "--no-plot"]);
        args.data_dir = Some(PathBuf::from("data"));

        let config = run_config_from_args(&args).unwrap();
        assert_eq!(config.train_path, PathBuf::from("data/train.csv"));
        assert_eq!(config.ideal_path, PathBuf::from("data/ideal.csv"));
        assert_eq!(config.test_path, PathBuf::from("other/points.csv"));
        assert!(!config.plot);
    }

    #[test]
    fn missing_inputs_are_a_usage_error() {
        let mut args = run_args(&[]);
        args.data_dir = None;
        args.train = None;
        let err = run_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("--train"));
    }

    #[test]
    fn svg_requires_an_output_dir() {
        let mut args = run_args(&["--train", "t", "--ideal", "i", "--test", "x", "--svg"]);
        args.out_dir = None;
        assert_eq!(run_config_from_args(&args).unwrap_err().exit_code(), 2);
    }
}
