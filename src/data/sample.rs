//! Synthetic train / ideal / test datasets.
//!
//! The generated layout follows the classic exercise this tool is built for:
//! a 400-row grid `x ∈ [-20, 20)` with step 0.1, a pool of candidate ("ideal")
//! functions, a handful of training curves that are noisy copies of planted
//! candidates, and test points drawn on the grid from the planted candidates
//! (plus a fraction of outliers).
//!
//! Everything is driven by a seeded `StdRng`, so a given config always yields
//! the same files.

use std::fs::{create_dir_all, File};
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{CandidatePool, Curve, TestPoint, TrainingSet};
use crate::error::AppError;

/// Number of distinct function shapes in the candidate family.
const SHAPES: usize = 10;

/// Outliers are shifted by at least this much from their source curve.
const OUTLIER_MIN_OFFSET: f64 = 5.0;
const OUTLIER_MAX_OFFSET: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub n_candidates: usize,
    pub n_training: usize,
    pub n_test: usize,
    /// Standard deviation of the Gaussian noise on training and test values.
    pub noise_sd: f64,
    /// Probability that a test point is an outlier.
    pub outlier_fraction: f64,
    /// Grid is `x_i = (grid_start + i) / grid_scale` for `i in 0..grid_len`.
    pub grid_start: i64,
    pub grid_len: usize,
    pub grid_scale: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_candidates: 50,
            n_training: 4,
            n_test: 100,
            noise_sd: 0.3,
            outlier_fraction: 0.1,
            grid_start: -200,
            grid_len: 400,
            grid_scale: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub xs: Vec<f64>,
    pub training: TrainingSet,
    pub pool: CandidatePool,
    pub test_points: Vec<TestPoint>,
    /// `(training_id, candidate_id)` for every planted pair.
    pub planted: Vec<(String, String)>,
    /// Source candidate of each test point (`None` for outliers).
    pub test_sources: Vec<Option<String>>,
}

pub fn generate_dataset(config: &SampleConfig) -> Result<SyntheticDataset, AppError> {
    if config.n_candidates == 0 || config.n_training == 0 {
        return Err(AppError::new(2, "Candidate and training counts must be > 0."));
    }
    if config.n_training > config.n_candidates {
        return Err(AppError::new(
            2,
            format!(
                "Cannot plant {} training curves in a pool of {} candidates.",
                config.n_training, config.n_candidates
            ),
        ));
    }
    if config.grid_len == 0 || !(config.grid_scale.is_finite() && config.grid_scale > 0.0) {
        return Err(AppError::new(2, "Invalid sample grid settings."));
    }
    if !(0.0..=1.0).contains(&config.outlier_fraction) {
        return Err(AppError::new(2, "Outlier fraction must be within [0, 1]."));
    }

    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let xs: Vec<f64> = (0..config.grid_len)
        .map(|i| (config.grid_start + i as i64) as f64 / config.grid_scale)
        .collect();

    let pool = CandidatePool::new(
        (0..config.n_candidates)
            .map(|j| {
                let ys: Vec<f64> = xs.iter().map(|&x| candidate_value(j, x)).collect();
                Curve::from_columns(format!("y{}", j + 1), &xs, &ys)
            })
            .collect(),
    );

    let planted_idx = rand::seq::index::sample(&mut rng, config.n_candidates, config.n_training).into_vec();

    let mut training = Vec::with_capacity(config.n_training);
    let mut planted = Vec::with_capacity(config.n_training);
    for (i, &j) in planted_idx.iter().enumerate() {
        let id = format!("y{}", i + 1);
        let ys: Vec<f64> = xs
            .iter()
            .map(|&x| candidate_value(j, x) + normal.sample(&mut rng))
            .collect();
        training.push(Curve::from_columns(id.clone(), &xs, &ys));
        planted.push((id, pool.curves[j].id.clone()));
    }

    let mut test_points = Vec::with_capacity(config.n_test);
    let mut test_sources = Vec::with_capacity(config.n_test);
    for _ in 0..config.n_test {
        let x = xs[rng.gen_range(0..xs.len())];
        let j = planted_idx[rng.gen_range(0..planted_idx.len())];
        let base = candidate_value(j, x);

        if rng.gen_bool(config.outlier_fraction) {
            let offset = rng.gen_range(OUTLIER_MIN_OFFSET..OUTLIER_MAX_OFFSET);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            test_points.push(TestPoint { x, y: base + sign * offset });
            test_sources.push(None);
        } else {
            test_points.push(TestPoint {
                x,
                y: base + normal.sample(&mut rng),
            });
            test_sources.push(Some(pool.curves[j].id.clone()));
        }
    }

    Ok(SyntheticDataset {
        xs,
        training: TrainingSet::new(training),
        pool,
        test_points,
        planted,
        test_sources,
    })
}

/// Value of the `j`-th candidate function at `x`.
///
/// Candidates cycle through a fixed family of shapes; every full cycle bumps
/// the scale factor `k`, so no two candidates coincide.
pub fn candidate_value(j: usize, x: f64) -> f64 {
    let k = (j / SHAPES) as f64 + 1.0;
    match j % SHAPES {
        0 => k * x,
        1 => x * x / k,
        2 => k * (x / k).sin(),
        3 => k * (x / k).cos(),
        4 => x.powi(3) / (100.0 * k),
        5 => k * x + 2.0 * k,
        6 => k * (x.abs() + 1.0).ln(),
        7 => k * (x / 10.0).exp(),
        8 => x.sin() - k * x,
        _ => k * x.abs().sqrt(),
    }
}

/// Write `train.csv`, `ideal.csv` and `test.csv` into `dir`.
pub fn write_dataset(dir: &Path, dataset: &SyntheticDataset) -> Result<(), AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;

    write_wide_csv(&dir.join("train.csv"), &dataset.xs, &dataset.training.curves)?;
    write_wide_csv(&dir.join("ideal.csv"), &dataset.xs, &dataset.pool.curves)?;

    let path = dir.join("test.csv");
    let mut writer = csv_writer(&path)?;
    write_row(&mut writer, ["x".to_string(), "y".to_string()])?;
    for p in &dataset.test_points {
        write_row(&mut writer, [p.x.to_string(), p.y.to_string()])?;
    }
    flush(writer)?;

    info!(
        dir = %dir.display(),
        rows = dataset.xs.len(),
        candidates = dataset.pool.len(),
        test_points = dataset.test_points.len(),
        "wrote synthetic dataset"
    );
    Ok(())
}

fn write_wide_csv(path: &Path, xs: &[f64], curves: &[Curve]) -> Result<(), AppError> {
    let mut writer = csv_writer(path)?;

    let header = std::iter::once("x".to_string()).chain(curves.iter().map(|c| c.id.clone()));
    write_row(&mut writer, header)?;

    for (i, x) in xs.iter().enumerate() {
        let row = std::iter::once(x.to_string()).chain(
            curves
                .iter()
                .map(|c| c.samples.get(i).map(|s| s.y.to_string()).unwrap_or_default()),
        );
        write_row(&mut writer, row)?;
    }

    flush(writer)
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))
}

fn write_row<I>(writer: &mut csv::Writer<File>, row: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = String>,
{
    writer
        .write_record(row)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))
}

fn flush(mut writer: csv::Writer<File>) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))
}
