//! Plot rendering.
//!
//! - `ascii`: deterministic terminal plot
//! - `chart`: SVG charts (plotters) for the best-fit and mapping views
//!
//! Both render from a borrowed [`PlotData`] view, so the same code serves a
//! fresh run and a results file loaded from disk.

use std::path::{Path, PathBuf};

use crate::domain::{AssignmentResult, Curve, FitResult};
use crate::error::AppError;
use crate::io::ResultsFile;

pub mod ascii;
pub mod chart;

pub use ascii::render_ascii_plot;
pub use chart::{render_best_fit_svg, render_mapping_svg};

/// Everything a chart needs, borrowed from a run's results.
#[derive(Debug, Clone, Copy)]
pub struct PlotData<'a> {
    pub fits: &'a [FitResult],
    pub training: &'a [Curve],
    /// Chosen ideal curves.
    pub ideal: &'a [Curve],
    pub assignments: &'a [AssignmentResult],
}

/// Data bounds of a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl<'a> PlotData<'a> {
    pub fn from_results(results: &'a ResultsFile) -> Self {
        Self {
            fits: &results.fits,
            training: &results.training,
            ideal: &results.ideal,
            assignments: &results.assignments,
        }
    }

    pub fn ideal_for(&self, fit: &FitResult) -> Option<&'a Curve> {
        self.ideal.iter().find(|c| c.id == fit.candidate_id)
    }

    pub fn training_for(&self, fit: &FitResult) -> Option<&'a Curve> {
        self.training.iter().find(|c| c.id == fit.training_id)
    }

    /// Position of a chosen ideal curve, used to pick a stable color.
    pub fn ideal_index(&self, candidate_id: &str) -> Option<usize> {
        self.ideal.iter().position(|c| c.id == candidate_id)
    }

    /// Bounds over training samples, chosen ideal curves and test points.
    ///
    /// `None` when there is nothing finite to plot.
    pub fn bounds(&self) -> Option<Bounds> {
        let curve_points = self
            .training
            .iter()
            .chain(self.ideal.iter())
            .flat_map(|c| c.samples.iter().map(|s| (s.x, s.y)));
        let test_points = self.assignments.iter().map(|a| (a.x, a.y));

        let mut b = Bounds {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for (x, y) in curve_points.chain(test_points) {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }

        if !b.x_min.is_finite() {
            return None;
        }
        if b.x_max <= b.x_min {
            b.x_min -= 0.5;
            b.x_max += 0.5;
        }
        if b.y_max <= b.y_min {
            b.y_min -= 0.5;
            b.y_max += 0.5;
        }
        Some(b)
    }
}

impl Bounds {
    /// Widen the y-range by `frac` of its span on both sides.
    pub fn pad_y(self, frac: f64) -> Self {
        let pad = ((self.y_max - self.y_min).abs() * frac).max(1e-12);
        Self {
            y_min: self.y_min - pad,
            y_max: self.y_max + pad,
            ..self
        }
    }
}

/// Write `best_fit.svg` and `mapping.svg` into `dir`.
pub fn write_svg_charts(dir: &Path, results: &ResultsFile) -> Result<Vec<PathBuf>, AppError> {
    let data = PlotData::from_results(results);

    let best_fit = dir.join("best_fit.svg");
    render_best_fit_svg(&best_fit, &data)?;

    let mapping = dir.join("mapping.svg");
    render_mapping_svg(&mapping, &data)?;

    Ok(vec![best_fit, mapping])
}
