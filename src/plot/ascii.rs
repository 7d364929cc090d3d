//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - chosen ideal curves: `-` line
//! - matched test points: `o`
//! - unmatched test points: `x`

use super::{Bounds, PlotData};

/// Render the chosen ideal curves and the mapped test points.
pub fn render_ascii_plot(data: &PlotData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let b = data
        .bounds()
        .unwrap_or(Bounds {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
        })
        .pad_y(0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for curve in data.ideal {
        let points: Vec<(f64, f64)> = curve.samples.iter().map(|s| (s.x, s.y)).collect();
        draw_curve(&mut grid, &points, &b);
    }

    // Matched points win over unmatched ones sharing a cell.
    let (matched, unmatched): (Vec<_>, Vec<_>) = data.assignments.iter().partition(|a| a.is_matched());
    for (points, ch) in [(unmatched, 'x'), (matched, 'o')] {
        for a in points {
            if !(a.x.is_finite() && a.y.is_finite()) {
                continue;
            }
            let x = map_x(a.x, b.x_min, b.x_max, width);
            let y = map_y(a.y, b.y_min, b.y_max, height);
            grid[y][x] = ch;
        }
    }

    let n_matched = data.assignments.iter().filter(|a| a.is_matched()).count();

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{:.3}, {:.3}] | y=[{:.2}, {:.2}] | matched {}/{}\n",
        b.x_min,
        b.x_max,
        b.y_min,
        b.y_max,
        n_matched,
        data.assignments.len()
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], b: &Bounds) {
    let height = grid.len();
    let Some(width) = grid.first().map(Vec::len) else {
        return;
    };

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, b.x_min, b.x_max, width);
        let row = map_y(y, b.y_min, b.y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
