//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during matching and assignment
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One `(x, y)` observation of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// An identified curve sampled on an ordered x-grid.
///
/// Curves compared against each other must share the exact same grid
/// (same count, same x-values, same order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub id: String,
    pub samples: Vec<Sample>,
}

impl Curve {
    pub fn new(id: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            id: id.into(),
            samples,
        }
    }

    /// Build a curve from parallel x / y columns (truncated to the shorter one).
    pub fn from_columns(id: impl Into<String>, xs: &[f64], ys: &[f64]) -> Self {
        let samples = xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| Sample { x, y })
            .collect();
        Self::new(id, samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.x)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.y)
    }
}

/// Training curves, each of which needs exactly one best-fit candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub curves: Vec<Curve>,
}

impl TrainingSet {
    pub fn new(curves: Vec<Curve>) -> Self {
        Self { curves }
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Curve> {
        self.curves.iter()
    }
}

/// The pool of candidate ("ideal") curves, in a stable iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePool {
    pub curves: Vec<Curve>,
}

impl CandidatePool {
    pub fn new(curves: Vec<Curve>) -> Self {
        Self { curves }
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Curve> {
        self.curves.iter()
    }

    /// Find a candidate by id (first match in pool order).
    pub fn get(&self, id: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.id == id)
    }

    /// A copy of the pool without the given candidate.
    pub fn without(&self, id: &str) -> CandidatePool {
        CandidatePool {
            curves: self.curves.iter().filter(|c| c.id != id).cloned().collect(),
        }
    }
}

/// Best-fit outcome for one training curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub training_id: String,
    pub candidate_id: String,
    pub sum_squared_error: f64,
    pub mean_squared_error: f64,
    /// Largest pointwise `|training - candidate|`; the acceptance threshold
    /// used when assigning test points.
    pub max_abs_deviation: f64,
    pub n_points: usize,
}

/// An independent test observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestPoint {
    pub x: f64,
    pub y: f64,
}

/// Classification of one test point against the chosen candidates.
///
/// `matched_candidate_id`, `deviation` and `score` are either all present or
/// all absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub x: f64,
    pub y: f64,
    pub matched_candidate_id: Option<String>,
    pub deviation: Option<f64>,
    pub score: Option<f64>,
}

impl AssignmentResult {
    pub fn unmatched(point: TestPoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            matched_candidate_id: None,
            deviation: None,
            score: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched_candidate_id.is_some()
    }
}

/// Whether a candidate may be chosen by more than one training curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PoolPolicy {
    /// Every training curve is matched against the full pool (duplicates possible).
    #[default]
    Shared,
    /// Training curves are matched in order; a chosen candidate leaves the pool.
    Exclusive,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub train_path: PathBuf,
    pub ideal_path: PathBuf,
    pub test_path: PathBuf,
    /// Column-name prefix selecting curve columns in the wide tables.
    pub column_prefix: String,
    pub policy: PoolPolicy,

    /// Directory receiving CSV/JSON (and optionally SVG) outputs.
    pub out_dir: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub svg: bool,
}

impl RunConfig {
    /// Config for the conventional `train.csv` / `ideal.csv` / `test.csv` layout.
    pub fn from_data_dir(dir: &std::path::Path) -> Self {
        Self {
            train_path: dir.join("train.csv"),
            ideal_path: dir.join("ideal.csv"),
            test_path: dir.join("test.csv"),
            ..Self::default()
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("train.csv"),
            ideal_path: PathBuf::from("ideal.csv"),
            test_path: PathBuf::from("test.csv"),
            column_prefix: "y".to_string(),
            policy: PoolPolicy::Shared,
            out_dir: None,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            svg: false,
        }
    }
}
