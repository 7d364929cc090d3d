//! Least-squares matching of one training curve against a candidate pool.
//!
//! Given a training curve `t` and candidates `c_1..c_m` on the same x-grid we
//! compute, for every candidate:
//!
//! ```text
//! SSE_j = Σ_i (t.y_i - c_j.y_i)^2
//! ```
//!
//! and keep the candidate with the smallest SSE. Ties go to the candidate
//! encountered first in pool order (only a strictly smaller SSE replaces the
//! current best). For the winner we also record `max_i |t.y_i - c.y_i|`, which
//! becomes that candidate's acceptance threshold during point assignment.

use tracing::debug;

use crate::domain::{CandidatePool, Curve, FitResult};
use crate::error::MatchError;
use crate::math::{max_abs_deviation, sum_squared_error};

/// Select the candidate that minimizes the sum of squared errors against `training`.
pub fn select_best_fit(training: &Curve, candidates: &CandidatePool) -> Result<FitResult, MatchError> {
    let Some(first) = candidates.iter().next() else {
        return Err(MatchError::EmptyCandidatePool {
            training: training.id.clone(),
        });
    };
    if training.is_empty() {
        return Err(MatchError::InputMismatch {
            training: training.id.clone(),
            candidate: first.id.clone(),
            detail: "training curve has 0 samples".to_string(),
        });
    }

    let train_y: Vec<f64> = training.ys().collect();
    ensure_finite_curve(training, "training")?;

    let mut cand_y = Vec::with_capacity(train_y.len());
    let mut best: Option<(&Curve, f64)> = None;

    for candidate in candidates.iter() {
        ensure_finite_curve(candidate, "candidate")?;
        ensure_same_grid(training, candidate)?;

        cand_y.clear();
        cand_y.extend(candidate.ys());
        let sse = sum_squared_error(&train_y, &cand_y);

        match best {
            Some((_, best_sse)) if sse >= best_sse => {}
            _ => best = Some((candidate, sse)),
        }
    }

    let Some((chosen, sse)) = best else {
        return Err(MatchError::EmptyCandidatePool {
            training: training.id.clone(),
        });
    };

    let chosen_y: Vec<f64> = chosen.ys().collect();
    let max_dev = max_abs_deviation(&train_y, &chosen_y);
    let n = train_y.len();

    debug!(
        training = %training.id,
        candidate = %chosen.id,
        sse,
        max_dev,
        "selected best fit"
    );

    Ok(FitResult {
        training_id: training.id.clone(),
        candidate_id: chosen.id.clone(),
        sum_squared_error: sse,
        mean_squared_error: sse / n as f64,
        max_abs_deviation: max_dev,
        n_points: n,
    })
}

/// Check that `candidate` is sampled on exactly the same x-grid as `training`.
pub fn ensure_same_grid(training: &Curve, candidate: &Curve) -> Result<(), MatchError> {
    let mismatch = |detail: String| MatchError::InputMismatch {
        training: training.id.clone(),
        candidate: candidate.id.clone(),
        detail,
    };

    if training.len() != candidate.len() {
        return Err(mismatch(format!(
            "{} samples vs {} samples",
            training.len(),
            candidate.len()
        )));
    }

    for (i, (a, b)) in training.xs().zip(candidate.xs()).enumerate() {
        if a != b {
            return Err(mismatch(format!("x[{i}] is {a} vs {b}")));
        }
    }

    Ok(())
}

pub(crate) fn ensure_finite_curve(curve: &Curve, role: &str) -> Result<(), MatchError> {
    let finite = curve.samples.iter().all(|s| s.x.is_finite() && s.y.is_finite());
    if finite {
        return Ok(());
    }
    Err(MatchError::NonFiniteValue {
        context: format!("{role} curve '{}'", curve.id),
    })
}
