//! Deviation-based assignment of test points.
//!
//! For a test point `(x, y)` and each fit (chosen candidate `c` with threshold
//! `d_max`):
//!
//! ```text
//! deviation = |y - c(x)|
//! accepted  ⇔ deviation ≤ d_max · √2
//! score     = d_max · √2 - deviation
//! ```
//!
//! The accepted candidate with the smallest deviation wins; ties go to the
//! earliest fit. Candidates whose grid does not contain `x` are skipped for
//! that point only. Points with no accepted candidate stay unmatched.

use rayon::prelude::*;
use tracing::{info, trace};

use crate::assign::lookup::GridLookup;
use crate::domain::{AssignmentResult, CandidatePool, FitResult, TestPoint};
use crate::error::MatchError;
use crate::fit::matcher::ensure_finite_curve;

/// Multiplier applied to a fit's maximum training deviation to obtain the
/// acceptance limit for test points.
pub const DEVIATION_FACTOR: f64 = std::f64::consts::SQRT_2;

/// A chosen candidate prepared for repeated lookups.
#[derive(Debug)]
struct ChosenCurve<'a> {
    lookup: GridLookup<'a>,
    limit: f64,
}

/// Classify every test point; output order matches `test_points`.
pub fn assign_points(
    test_points: &[TestPoint],
    fits: &[FitResult],
    pool: &CandidatePool,
) -> Result<Vec<AssignmentResult>, MatchError> {
    let chosen = prepare(fits, pool)?;

    for (i, p) in test_points.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(MatchError::NonFiniteValue {
                context: format!("test point #{} ({}, {})", i + 1, p.x, p.y),
            });
        }
    }

    let results: Vec<AssignmentResult> = test_points
        .par_iter()
        .map(|&p| assign_point(p, &chosen))
        .collect();

    let matched = results.iter().filter(|r| r.is_matched()).count();
    info!(
        points = results.len(),
        matched,
        unmatched = results.len() - matched,
        "assigned test points"
    );

    Ok(results)
}

/// Acceptance limit for a given maximum training deviation.
pub fn acceptance_limit(max_abs_deviation: f64) -> f64 {
    max_abs_deviation * DEVIATION_FACTOR
}

fn prepare<'a>(fits: &[FitResult], pool: &'a CandidatePool) -> Result<Vec<ChosenCurve<'a>>, MatchError> {
    fits.iter()
        .map(|fit| {
            let curve = pool
                .get(&fit.candidate_id)
                .ok_or_else(|| MatchError::UnknownCandidate(fit.candidate_id.clone()))?;
            ensure_finite_curve(curve, "chosen candidate")?;
            if !fit.max_abs_deviation.is_finite() {
                return Err(MatchError::NonFiniteValue {
                    context: format!("deviation threshold of '{}'", fit.candidate_id),
                });
            }
            Ok(ChosenCurve {
                lookup: GridLookup::new(curve),
                limit: acceptance_limit(fit.max_abs_deviation),
            })
        })
        .collect()
}

fn assign_point(point: TestPoint, chosen: &[ChosenCurve<'_>]) -> AssignmentResult {
    let mut best: Option<(&ChosenCurve<'_>, f64)> = None;

    for c in chosen {
        let y_ideal = match c.lookup.y_at(point.x) {
            Ok(y) => y,
            Err(err) => {
                trace!(%err, "candidate skipped for test point");
                continue;
            }
        };

        let deviation = (point.y - y_ideal).abs();
        if deviation > c.limit {
            continue;
        }

        match best {
            Some((_, best_dev)) if deviation >= best_dev => {}
            _ => best = Some((c, deviation)),
        }
    }

    match best {
        Some((c, deviation)) => AssignmentResult {
            x: point.x,
            y: point.y,
            matched_candidate_id: Some(c.lookup.candidate_id().to_string()),
            deviation: Some(deviation),
            score: Some(c.limit - deviation),
        },
        None => AssignmentResult::unmatched(point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Curve, TrainingSet};
    use crate::fit::select_all;
    use approx::assert_abs_diff_eq;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    const GRID: [f64; 4] = [0.0, 1.0, 2.0, 3.0];

    fn curve(id: &str, f: impl Fn(f64) -> f64) -> Curve {
        let ys: Vec<f64> = GRID.iter().map(|&x| f(x)).collect();
        Curve::from_columns(id, &GRID, &ys)
    }

    fn fit(candidate: &str, max_abs_deviation: f64) -> FitResult {
        FitResult {
            training_id: format!("t-{candidate}"),
            candidate_id: candidate.to_string(),
            sum_squared_error: 0.0,
            mean_squared_error: 0.0,
            max_abs_deviation,
            n_points: GRID.len(),
        }
    }

    fn point(x: f64, y: f64) -> TestPoint {
        TestPoint { x, y }
    }

    #[test]
    fn zero_threshold_only_accepts_exact_values() {
        let pool = CandidatePool::new(vec![curve("A", |x| x), curve("B", |x| 2.0 * x)]);
        let training = TrainingSet::new(vec![curve("t", |x| x)]);
        let fits = select_all(&training, &pool, Default::default()).unwrap();
        assert_eq!(fits[0].candidate_id, "A");

        let results = assign_points(&[point(1.0, 0.0001), point(1.0, 1.0)], &fits, &pool).unwrap();

        assert_eq!(results[0], AssignmentResult::unmatched(point(1.0, 0.0001)));

        assert_eq!(results[1].matched_candidate_id.as_deref(), Some("A"));
        assert_eq!(results[1].deviation, Some(0.0));
        assert_eq!(results[1].score, Some(0.0));
    }

    #[test]
    fn deviation_within_sqrt2_of_threshold_is_accepted() {
        let pool = CandidatePool::new(vec![curve("A", |x| x)]);
        let fits = vec![fit("A", 0.5)];

        let results = assign_points(&[point(2.0, 2.6)], &fits, &pool).unwrap();
        let r = &results[0];
        assert_eq!(r.matched_candidate_id.as_deref(), Some("A"));
        assert_abs_diff_eq!(r.deviation.unwrap(), 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(r.score.unwrap(), 0.5 * std::f64::consts::SQRT_2 - 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(r.score.unwrap(), 0.107, epsilon = 1e-3);
    }

    #[test]
    fn deviation_beyond_limit_is_rejected() {
        let pool = CandidatePool::new(vec![curve("A", |x| x)]);
        let fits = vec![fit("A", 0.5)];

        let results = assign_points(&[point(2.0, 2.71)], &fits, &pool).unwrap();
        assert!(!results[0].is_matched());
        assert_eq!(results[0].deviation, None);
        assert_eq!(results[0].score, None);
    }

    #[test]
    fn smallest_accepted_deviation_wins() {
        let pool = CandidatePool::new(vec![curve("wide", |x| x + 0.8), curve("tight", |x| x + 0.1)]);
        let fits = vec![fit("wide", 10.0), fit("tight", 0.2)];

        let results = assign_points(&[point(1.0, 1.0)], &fits, &pool).unwrap();
        assert_eq!(results[0].matched_candidate_id.as_deref(), Some("tight"));
        assert_abs_diff_eq!(results[0].deviation.unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn closer_but_rejected_candidate_does_not_block_accepted_one() {
        let pool = CandidatePool::new(vec![curve("near", |x| x + 0.1), curve("far", |x| x + 0.5)]);
        let fits = vec![fit("near", 0.0), fit("far", 1.0)];

        let results = assign_points(&[point(1.0, 1.0)], &fits, &pool).unwrap();
        assert_eq!(results[0].matched_candidate_id.as_deref(), Some("far"));
    }

    #[test]
    fn equal_deviation_goes_to_first_fit() {
        let pool = CandidatePool::new(vec![curve("up", |x| x + 0.25), curve("down", |x| x - 0.25)]);
        let fits = vec![fit("down", 1.0), fit("up", 1.0)];

        let results = assign_points(&[point(3.0, 3.0)], &fits, &pool).unwrap();
        assert_eq!(results[0].matched_candidate_id.as_deref(), Some("down"));
    }

    #[test]
    fn off_grid_candidate_is_skipped_for_that_point_only() {
        let coarse = Curve::from_columns("coarse", &[0.0, 2.0], &[0.0, 2.0]);
        let pool = CandidatePool::new(vec![coarse, curve("fine", |x| x + 0.3)]);
        let fits = vec![fit("coarse", 1.0), fit("fine", 1.0)];

        let results = assign_points(&[point(1.0, 1.0), point(2.0, 2.0)], &fits, &pool).unwrap();
        assert_eq!(results[0].matched_candidate_id.as_deref(), Some("fine"));
        assert_eq!(results[1].matched_candidate_id.as_deref(), Some("coarse"));
    }

    #[test]
    fn point_off_every_grid_is_unmatched() {
        let pool = CandidatePool::new(vec![curve("A", |x| x)]);
        let fits = vec![fit("A", 100.0)];

        let results = assign_points(&[point(0.5, 0.5)], &fits, &pool).unwrap();
        assert!(!results[0].is_matched());
    }

    #[test]
    fn unknown_candidate_is_an_error() {
        let pool = CandidatePool::new(vec![curve("A", |x| x)]);
        let err = assign_points(&[point(0.0, 0.0)], &[fit("Z", 1.0)], &pool).unwrap_err();
        assert_eq!(err, MatchError::UnknownCandidate("Z".to_string()));
    }

    #[test]
    fn non_finite_inputs_are_errors() {
        let pool = CandidatePool::new(vec![curve("A", |x| x)]);

        let err = assign_points(&[point(0.0, f64::NAN)], &[fit("A", 1.0)], &pool).unwrap_err();
        assert!(matches!(err, MatchError::NonFiniteValue { .. }));

        let err = assign_points(&[point(0.0, 0.0)], &[fit("A", f64::INFINITY)], &pool).unwrap_err();
        assert!(matches!(err, MatchError::NonFiniteValue { .. }));
    }

    #[test]
    fn nan_in_chosen_candidate_is_an_error_not_a_match() {
        let pool = CandidatePool::new(vec![Curve::from_columns("A", &[0.0, 1.0], &[0.0, f64::NAN])]);

        let err = assign_points(&[point(1.0, 100.0)], &[fit("A", 0.5)], &pool).unwrap_err();
        assert!(matches!(err, MatchError::NonFiniteValue { ref context } if context.contains("'A'")));
    }

    #[test]
    fn empty_inputs() {
        let pool = CandidatePool::new(vec![curve("A", |x| x)]);
        assert!(assign_points(&[], &[fit("A", 1.0)], &pool).unwrap().is_empty());

        let results = assign_points(&[point(1.0, 1.0)], &[], &pool).unwrap();
        assert_eq!(results, vec![AssignmentResult::unmatched(point(1.0, 1.0))]);
    }

    #[test]
    fn results_are_sound_ordered_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let xs: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();
        let mk = |id: &str, f: &dyn Fn(f64) -> f64| {
            let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
            Curve::from_columns(id, &xs, &ys)
        };
        let pool = CandidatePool::new(vec![
            mk("lin", &|x: f64| 0.5 * x),
            mk("sin", &|x: f64| x.sin()),
            mk("const", &|_: f64| 1.0),
        ]);
        let fits = vec![fit("lin", 0.3), fit("sin", 0.2), fit("const", 0.4)];

        let points: Vec<TestPoint> = (0..500)
            .map(|_| {
                let x = xs[rng.gen_range(0..xs.len())];
                point(x, rng.gen_range(-2.0..12.0))
            })
            .collect();

        let results = assign_points(&points, &fits, &pool).unwrap();
        assert_eq!(results.len(), points.len());

        for (p, r) in points.iter().zip(results.iter()) {
            assert_eq!((r.x, r.y), (p.x, p.y));

            let accepted: Vec<(String, f64)> = fits
                .iter()
                .filter_map(|f| {
                    let c = pool.get(&f.candidate_id)?;
                    let y = GridLookup::new(c).y_at(p.x).ok()?;
                    let d = (p.y - y).abs();
                    (d <= acceptance_limit(f.max_abs_deviation)).then(|| (f.candidate_id.clone(), d))
                })
                .collect();

            match &r.matched_candidate_id {
                None => assert!(accepted.is_empty()),
                Some(id) => {
                    let dev = r.deviation.unwrap();
                    assert!(r.score.unwrap() >= 0.0);
                    assert!(accepted.iter().any(|(a, d)| a == id && *d == dev));
                    assert!(accepted.iter().all(|(_, d)| dev <= *d));
                }
            }
        }

        assert_eq!(results, assign_points(&points, &fits, &pool).unwrap());
    }
}
