//! Best-fit selection for a whole training set.
//!
//! Two pool policies are supported:
//!
//! - `Shared`: every training curve sees the full pool. Selections are
//!   independent, so they run in parallel (rayon) and the same candidate may
//!   be chosen more than once.
//! - `Exclusive`: training curves are matched in order and each chosen
//!   candidate is removed from the pool before the next selection.
//!
//! Results are always returned in training-set order.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{CandidatePool, FitResult, PoolPolicy, TrainingSet};
use crate::error::MatchError;
use crate::fit::matcher::select_best_fit;

/// Match every training curve against the pool.
pub fn select_all(
    training: &TrainingSet,
    pool: &CandidatePool,
    policy: PoolPolicy,
) -> Result<Vec<FitResult>, MatchError> {
    let fits = match policy {
        PoolPolicy::Shared => training
            .curves
            .par_iter()
            .map(|curve| select_best_fit(curve, pool))
            .collect::<Result<Vec<_>, _>>()?,
        PoolPolicy::Exclusive => select_exclusive(training, pool)?,
    };

    if policy == PoolPolicy::Shared {
        warn_on_shared_candidates(&fits);
    }

    info!(
        training = training.len(),
        candidates = pool.len(),
        ?policy,
        "matched training curves"
    );

    Ok(fits)
}

fn select_exclusive(training: &TrainingSet, pool: &CandidatePool) -> Result<Vec<FitResult>, MatchError> {
    let mut remaining = pool.clone();
    let mut fits = Vec::with_capacity(training.len());

    for curve in training.iter() {
        let fit = select_best_fit(curve, &remaining)?;
        remaining = remaining.without(&fit.candidate_id);
        fits.push(fit);
    }

    Ok(fits)
}

fn warn_on_shared_candidates(fits: &[FitResult]) {
    for (i, fit) in fits.iter().enumerate() {
        if let Some(other) = fits[..i].iter().find(|f| f.candidate_id == fit.candidate_id) {
            warn!(
                candidate = %fit.candidate_id,
                first = %other.training_id,
                second = %fit.training_id,
                "candidate chosen by more than one training curve"
            );
        }
    }
}

/// Fits ordered by ascending mean squared error (stable for ties).
pub fn rank_by_mse(fits: &[FitResult]) -> Vec<FitResult> {
    let mut ranked = fits.to_vec();
    ranked.sort_by(|a, b| {
        a.mean_squared_error
            .partial_cmp(&b.mean_squared_error)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
