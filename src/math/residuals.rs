//! Residual statistics between two curves sampled on the same grid.
//!
//! The matcher compares one training curve against many candidates:
//!
//! ```text
//! r_i = y_train_i - y_candidate_i
//! SSE = Σ r_i^2
//! max_dev = max_i |r_i|
//! ```
//!
//! Residuals are held in an `nalgebra::DVector` so the norms come straight
//! from nalgebra. Callers are responsible for grid alignment and finiteness;
//! these helpers only see y-values.

use nalgebra::DVector;

/// Residual vector `a - b`.
///
/// # Panics
/// Panics if `a` and `b` differ in length. The matcher validates grids first.
pub(crate) fn residual_vector(a: &[f64], b: &[f64]) -> DVector<f64> {
    DVector::from_row_slice(a) - DVector::from_row_slice(b)
}

/// Sum of squared residuals.
pub fn sum_squared_error(a: &[f64], b: &[f64]) -> f64 {
    residual_vector(a, b).norm_squared()
}

/// Largest absolute residual (`0.0` for empty inputs).
pub fn max_abs_deviation(a: &[f64], b: &[f64]) -> f64 {
    residual_vector(a, b).amax()
}
