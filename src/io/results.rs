//! Read/write run results JSON files.
//!
//! Results JSON is the "portable" representation of a mapping run:
//! - run metadata (tool, timestamp, pool policy, column prefix)
//! - the fits and the per-point assignments
//! - the training curves and the chosen ideal curves, so charts can be
//!   re-rendered later without the source tables

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AssignmentResult, CandidatePool, Curve, FitResult, PoolPolicy, RunConfig, TrainingSet};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub policy: PoolPolicy,
    pub column_prefix: String,
    pub fits: Vec<FitResult>,
    pub assignments: Vec<AssignmentResult>,
    pub training: Vec<Curve>,
    /// Chosen candidates only, in fit order without repeats.
    pub ideal: Vec<Curve>,
}

impl ResultsFile {
    pub fn new(
        config: &RunConfig,
        training: &TrainingSet,
        pool: &CandidatePool,
        fits: Vec<FitResult>,
        assignments: Vec<AssignmentResult>,
    ) -> Self {
        let mut ideal: Vec<Curve> = Vec::new();
        for fit in &fits {
            if ideal.iter().any(|c| c.id == fit.candidate_id) {
                continue;
            }
            if let Some(curve) = pool.get(&fit.candidate_id) {
                ideal.push(curve.clone());
            }
        }

        Self {
            tool: "cmap".to_string(),
            generated_at: Utc::now(),
            policy: config.policy,
            column_prefix: config.column_prefix.clone(),
            fits,
            assignments,
            training: training.curves.clone(),
            ideal,
        }
    }

    /// The chosen ideal curve for a fit, if present.
    pub fn ideal_for(&self, fit: &FitResult) -> Option<&Curve> {
        self.ideal.iter().find(|c| c.id == fit.candidate_id)
    }

    /// The training curve for a fit, if present.
    pub fn training_for(&self, fit: &FitResult) -> Option<&Curve> {
        self.training.iter().find(|c| c.id == fit.training_id)
    }
}

/// Write a results JSON file.
pub fn write_results_json(path: &Path, results: &ResultsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, results)
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    let results: ResultsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TestPoint;

    fn fit(training: &str, candidate: &str) -> FitResult {
        FitResult {
            training_id: training.to_string(),
            candidate_id: candidate.to_string(),
            sum_squared_error: 1.0,
            mean_squared_error: 0.5,
            max_abs_deviation: 0.75,
            n_points: 2,
        }
    }

    fn sample_results() -> ResultsFile {
        let xs = [0.0, 1.0];
        let training = TrainingSet::new(vec![
            Curve::from_columns("y1", &xs, &[0.1, 1.1]),
            Curve::from_columns("y2", &xs, &[2.0, 2.0]),
        ]);
        let pool = CandidatePool::new(vec![
            Curve::from_columns("y1", &xs, &[0.0, 1.0]),
            Curve::from_columns("y2", &xs, &[9.0, 9.0]),
            Curve::from_columns("y3", &xs, &[2.0, 2.0]),
        ]);
        let fits = vec![fit("y1", "y1"), fit("y2", "y3"), fit("y3", "y1")];
        let assignments = vec![AssignmentResult::unmatched(TestPoint { x: 0.0, y: 5.0 })];

        ResultsFile::new(&RunConfig::default(), &training, &pool, fits, assignments)
    }

    #[test]
    fn keeps_only_chosen_candidates_once() {
        let results = sample_results();
        let ids: Vec<&str> = results.ideal.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["y1", "y3"]);

        let second = &results.fits[1];
        assert_eq!(results.ideal_for(second).unwrap().id, "y3");
        assert_eq!(results.training_for(second).unwrap().id, "y2");
    }

    #[test]
    fn json_file_survives_a_write_and_read() {
        let results = sample_results();
        let path = std::env::temp_dir().join(format!("cmap-results-{}.json", std::process::id()));

        write_results_json(&path, &results).unwrap();
        let loaded = read_results_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, results);
        assert_eq!(loaded.policy, PoolPolicy::Shared);
    }

    #[test]
    fn thresholds_reload_bit_for_bit() {
        let mut results = sample_results();
        results.fits[0].max_abs_deviation = 0.9615945510082792;
        results.fits[1].mean_squared_error = 0.1 + 0.2;
        let path = std::env::temp_dir().join(format!("cmap-results-bits-{}.json", std::process::id()));

        write_results_json(&path, &results).unwrap();
        let loaded = read_results_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.fits[0].max_abs_deviation.to_bits(), 0.9615945510082792f64.to_bits());
        assert_eq!(loaded.fits[1].mean_squared_error.to_bits(), (0.1f64 + 0.2).to_bits());
    }

    #[test]
    fn invalid_json_is_reported() {
        let path = std::env::temp_dir().join(format!("cmap-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_results_json(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert_eq!(err.exit_code(), 2);
    }
}
