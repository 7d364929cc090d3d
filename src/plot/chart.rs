//! SVG charts rendered with plotters.
//!
//! Two views:
//! - best fit: training samples as dots, each chosen ideal function as a line
//!   in the same color, with the fit's MSE in the legend
//! - mapping: chosen ideal functions plus the test points, colored by the
//!   function they were mapped to (unmatched points as grey crosses)

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use super::PlotData;
use crate::error::AppError;

/// Pixel size of the SVG charts.
pub const CHART_SIZE: (u32, u32) = (1280, 760);

type DrawResult = Result<(), Box<dyn Error>>;

/// Render the best-fit chart into `path`.
pub fn render_best_fit_svg(path: &Path, data: &PlotData) -> Result<(), AppError> {
    write_svg(path, &best_fit_svg(data)?)
}

/// Render the test-point mapping chart into `path`.
pub fn render_mapping_svg(path: &Path, data: &PlotData) -> Result<(), AppError> {
    write_svg(path, &mapping_svg(data)?)
}

/// Best-fit chart as an SVG document.
pub fn best_fit_svg(data: &PlotData) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_best_fit(&root, data).map_err(plot_error)?;
        root.present()
            .map_err(|e| AppError::new(4, format!("Plotting error: {e}")))?;
    }
    Ok(svg)
}

/// Mapping chart as an SVG document.
pub fn mapping_svg(data: &PlotData) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_mapping(&root, data).map_err(plot_error)?;
        root.present()
            .map_err(|e| AppError::new(4, format!("Plotting error: {e}")))?;
    }
    Ok(svg)
}

fn draw_best_fit<DB>(root: &DrawingArea<DB, Shift>, data: &PlotData) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let b = data.bounds().ok_or("nothing to plot")?.pad_y(0.05);

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption("Training data and chosen ideal functions", ("sans-serif", 24))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(b.x_min..b.x_max, b.y_min..b.y_max)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .x_label_formatter(&|v| format!("{v:.1}"))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;

    for (i, fit) in data.fits.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();

        if let Some(training) = data.training_for(fit) {
            chart.draw_series(
                training
                    .samples
                    .iter()
                    .map(|s| Circle::new((s.x, s.y), 2, color.mix(0.5).filled())),
            )?;
        }

        if let Some(ideal) = data.ideal_for(fit) {
            chart
                .draw_series(LineSeries::new(
                    ideal.samples.iter().map(|s| (s.x, s.y)),
                    color.stroke_width(2),
                ))?
                .label(format!(
                    "Training {} → Ideal {} (MSE: {:.4})",
                    fit.training_id, fit.candidate_id, fit.mean_squared_error
                ))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(2)));
        }
    }

    draw_legend(&mut chart)
}

fn draw_mapping<DB>(root: &DrawingArea<DB, Shift>, data: &PlotData) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let b = data.bounds().ok_or("nothing to plot")?.pad_y(0.05);

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption("Test points mapped to ideal functions", ("sans-serif", 24))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(b.x_min..b.x_max, b.y_min..b.y_max)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .x_label_formatter(&|v| format!("{v:.1}"))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;

    let grey = RGBColor(150, 150, 150);
    for training in data.training {
        chart.draw_series(
            training
                .samples
                .iter()
                .map(|s| Circle::new((s.x, s.y), 1, grey.mix(0.4).filled())),
        )?;
    }

    for (i, ideal) in data.ideal.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                ideal.samples.iter().map(|s| (s.x, s.y)),
                color.stroke_width(2),
            ))?
            .label(format!("Ideal {}", ideal.id))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(2)));

        let matched = data
            .assignments
            .iter()
            .filter(|a| a.matched_candidate_id.as_deref() == Some(ideal.id.as_str()));
        chart.draw_series(matched.map(|a| Circle::new((a.x, a.y), 5, color.filled())))?;
    }

    let unmatched: Vec<(f64, f64)> = data
        .assignments
        .iter()
        .filter(|a| !a.is_matched())
        .map(|a| (a.x, a.y))
        .collect();
    if !unmatched.is_empty() {
        chart
            .draw_series(
                unmatched
                    .into_iter()
                    .map(|p| Cross::new(p, 5, grey.stroke_width(2))),
            )?
            .label("Unmatched test points")
            .legend(move |(x, y)| Cross::new((x + 15, y), 5, grey.stroke_width(2)));
    }

    draw_legend(&mut chart)
}

fn draw_legend<'a, DB>(chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>) -> DrawResult
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    Ok(())
}

fn plot_error(e: Box<dyn Error>) -> AppError {
    AppError::new(4, format!("Plotting error: {e}"))
}

fn write_svg(path: &Path, svg: &str) -> Result<(), AppError> {
    std::fs::write(path, svg)
        .map_err(|e| AppError::new(2, format!("Failed to write chart '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssignmentResult, Curve, FitResult, TestPoint};

    fn fixture() -> (Vec<FitResult>, Vec<Curve>, Vec<Curve>, Vec<AssignmentResult>) {
        let xs = [0.0, 1.0, 2.0];
        let fits = vec![FitResult {
            training_id: "y1".to_string(),
            candidate_id: "y3".to_string(),
            sum_squared_error: 0.03,
            mean_squared_error: 0.01,
            max_abs_deviation: 0.1,
            n_points: 3,
        }];
        let training = vec![Curve::from_columns("y1", &xs, &[0.1, 1.1, 2.1])];
        let ideal = vec![Curve::from_columns("y3", &xs, &[0.0, 1.0, 2.0])];
        let assignments = vec![
            AssignmentResult {
                x: 1.0,
                y: 1.05,
                matched_candidate_id: Some("y3".to_string()),
                deviation: Some(0.05),
                score: Some(0.09),
            },
            AssignmentResult::unmatched(TestPoint { x: 2.0, y: 9.0 }),
        ];
        (fits, training, ideal, assignments)
    }

    #[test]
    fn best_fit_svg_has_legend_with_mse() {
        let (fits, training, ideal, assignments) = fixture();
        let data = PlotData {
            fits: &fits,
            training: &training,
            ideal: &ideal,
            assignments: &assignments,
        };

        let svg = best_fit_svg(&data).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Ideal y3"));
        assert!(svg.contains("MSE: 0.0100"));
    }

    #[test]
    fn mapping_svg_labels_unmatched_points() {
        let (fits, training, ideal, assignments) = fixture();
        let data = PlotData {
            fits: &fits,
            training: &training,
            ideal: &ideal,
            assignments: &assignments,
        };

        let svg = mapping_svg(&data).unwrap();
        assert!(svg.contains("Unmatched test points"));
        assert!(svg.contains("Ideal y3"));
    }

    #[test]
    fn nothing_to_plot_is_an_error() {
        let data = PlotData {
            fits: &[],
            training: &[],
            ideal: &[],
            assignments: &[],
        };
        assert_eq!(best_fit_svg(&data).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn charts_are_written_to_disk() {
        let (fits, training, ideal, assignments) = fixture();
        let data = PlotData {
            fits: &fits,
            training: &training,
            ideal: &ideal,
            assignments: &assignments,
        };
        let path = std::env::temp_dir().join(format!("cmap-chart-{}.svg", std::process::id()));

        render_mapping_svg(&path, &data).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("<svg"));
    }
}
