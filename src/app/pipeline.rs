//! Shared mapping pipeline used by `cmap run` and the tests.
//!
//! The workflow is:
//! load tables -> match training curves -> assign test points -> summarize
//!
//! Front-ends only deal with presentation (printing, charts, files).

use std::fs::create_dir_all;
use std::path::PathBuf;

use tracing::info;

use crate::assign::{AssignmentSummary, assign_points, summarize};
use crate::domain::{CandidatePool, FitResult, RunConfig, TrainingSet};
use crate::error::AppError;
use crate::fit::{rank_by_mse, select_all};
use crate::io::{CurveTable, ResultsFile, TestTable};

/// Input tables of a run, already parsed.
#[derive(Debug, Clone)]
pub struct RunTables {
    pub training: CurveTable,
    pub ideal: CurveTable,
    pub test: TestTable,
}

/// Row counts from ingest, kept for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub training_rows: usize,
    pub training_skipped: usize,
    pub ideal_rows: usize,
    pub ideal_skipped: usize,
    pub test_rows: usize,
    pub test_skipped: usize,
}

/// All computed outputs of a single `cmap run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub training: TrainingSet,
    pub pool: CandidatePool,
    /// Fits, assignments and the curves needed to plot them.
    pub results: ResultsFile,
    /// Fits ordered by ascending MSE.
    pub ranked: Vec<FitResult>,
    pub summary: AssignmentSummary,
    pub stats: IngestStats,
}

/// Load the three tables named in `config` and run the mapping.
pub fn run_mapping(config: &RunConfig) -> Result<RunOutput, AppError> {
    let tables = RunTables {
        training: crate::io::load_curve_table(&config.train_path, &config.column_prefix)?,
        ideal: crate::io::load_curve_table(&config.ideal_path, &config.column_prefix)?,
        test: crate::io::load_test_points(&config.test_path)?,
    };
    run_mapping_tables(config, tables)
}

/// Run the mapping on tables that are already in memory.
pub fn run_mapping_tables(config: &RunConfig, tables: RunTables) -> Result<RunOutput, AppError> {
    let stats = IngestStats {
        training_rows: tables.training.rows_used,
        training_skipped: tables.training.row_errors.len(),
        ideal_rows: tables.ideal.rows_used,
        ideal_skipped: tables.ideal.row_errors.len(),
        test_rows: tables.test.rows_used,
        test_skipped: tables.test.row_errors.len(),
    };

    let training = tables.training.into_training_set();
    let pool = tables.ideal.into_pool();
    if training.is_empty() {
        return Err(AppError::new(3, "No training curves to match."));
    }

    let fits = select_all(&training, &pool, config.policy)?;
    let assignments = assign_points(&tables.test.points, &fits, &pool)?;
    let summary = summarize(&assignments);
    let ranked = rank_by_mse(&fits);

    info!(
        fits = fits.len(),
        matched = summary.matched,
        unmatched = summary.unmatched,
        "mapping finished"
    );

    let results = ResultsFile::new(config, &training, &pool, fits, assignments);

    Ok(RunOutput {
        training,
        pool,
        results,
        ranked,
        summary,
        stats,
    })
}

/// Write the CSV/JSON outputs (and SVG charts when enabled) into `config.out_dir`.
///
/// Returns the written paths; nothing is written without an output directory.
pub fn write_outputs(config: &RunConfig, output: &RunOutput) -> Result<Vec<PathBuf>, AppError> {
    let Some(dir) = &config.out_dir else {
        return Ok(Vec::new());
    };
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();

    let path = dir.join("fits.csv");
    crate::io::write_fits_csv(&path, &output.ranked)?;
    written.push(path);

    let path = dir.join("mapped_test_data.csv");
    crate::io::write_assignments_csv(&path, &output.results.assignments)?;
    written.push(path);

    let path = dir.join("results.json");
    crate::io::write_results_json(&path, &output.results)?;
    written.push(path);

    if config.svg {
        written.extend(crate::plot::write_svg_charts(dir, &output.results)?);
    }

    info!(dir = %dir.display(), files = written.len(), "wrote outputs");
    Ok(written)
}
