//! Exact-x lookup on a candidate's sample grid.
//!
//! Test points are only compared against a candidate at x-values that appear
//! verbatim on its grid; there is no interpolation. Keys are the bit patterns
//! of the x-values, with `-0.0` folded into `0.0`.

use std::collections::HashMap;

use crate::domain::Curve;
use crate::error::MatchError;

/// `y(x)` table for one candidate curve.
#[derive(Debug, Clone)]
pub struct GridLookup<'a> {
    candidate_id: &'a str,
    values: HashMap<u64, f64>,
}

impl<'a> GridLookup<'a> {
    /// Index a curve's samples. If an x-value repeats, the first sample wins.
    pub fn new(curve: &'a Curve) -> Self {
        let mut values = HashMap::with_capacity(curve.len());
        for s in &curve.samples {
            values.entry(key(s.x)).or_insert(s.y);
        }
        Self {
            candidate_id: &curve.id,
            values,
        }
    }

    pub fn candidate_id(&self) -> &str {
        self.candidate_id
    }

    /// The candidate's y at exactly `x`.
    pub fn y_at(&self, x: f64) -> Result<f64, MatchError> {
        self.values
            .get(&key(x))
            .copied()
            .ok_or_else(|| MatchError::PointOutOfDomain {
                candidate: self.candidate_id.to_string(),
                x,
            })
    }
}

fn key(x: f64) -> u64 {
    (x + 0.0).to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_grid_values() {
        let curve = Curve::from_columns("y7", &[-1.5, 0.0, 2.25], &[10.0, 20.0, 30.0]);
        let lookup = GridLookup::new(&curve);
        assert_eq!(lookup.y_at(-1.5).unwrap(), 10.0);
        assert_eq!(lookup.y_at(2.25).unwrap(), 30.0);
        assert_eq!(lookup.candidate_id(), "y7");
    }

    #[test]
    fn negative_zero_matches_zero() {
        let curve = Curve::from_columns("y7", &[0.0], &[4.0]);
        let lookup = GridLookup::new(&curve);
        assert_eq!(lookup.y_at(-0.0).unwrap(), 4.0);
    }

    #[test]
    fn off_grid_x_is_out_of_domain() {
        let curve = Curve::from_columns("y7", &[0.0, 1.0], &[4.0, 5.0]);
        let lookup = GridLookup::new(&curve);
        let err = lookup.y_at(0.5).unwrap_err();
        assert_eq!(
            err,
            MatchError::PointOutOfDomain {
                candidate: "y7".to_string(),
                x: 0.5
            }
        );
    }

    #[test]
    fn first_sample_wins_for_repeated_x() {
        let curve = Curve::from_columns("y7", &[1.0, 1.0], &[4.0, 9.0]);
        assert_eq!(GridLookup::new(&curve).y_at(1.0).unwrap(), 4.0);
    }
}
