//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the matching code stays clean and testable
//! - output changes are localized (snapshot-friendly)

use crate::app::pipeline::RunOutput;
use crate::assign::{AssignmentSummary, acceptance_limit};
use crate::domain::{AssignmentResult, FitResult, RunConfig};

/// Format the run header: inputs, ingest counts and policy.
pub fn format_run_summary(output: &RunOutput, config: &RunConfig) -> String {
    let s = &output.stats;
    let mut out = String::new();

    out.push_str("=== cmap - curve mapping ===\n");
    out.push_str(&format!(
        "Training: {} ({} curves, {} rows, {} skipped)\n",
        config.train_path.display(),
        output.training.len(),
        s.training_rows,
        s.training_skipped
    ));
    out.push_str(&format!(
        "Ideal   : {} ({} functions, {} rows, {} skipped)\n",
        config.ideal_path.display(),
        output.pool.len(),
        s.ideal_rows,
        s.ideal_skipped
    ));
    out.push_str(&format!(
        "Test    : {} ({} points, {} skipped)\n",
        config.test_path.display(),
        s.test_rows,
        s.test_skipped
    ));
    out.push_str(&format!("Policy  : {:?}\n", config.policy));

    out.push_str("\nBest fits (by MSE):\n");
    out.push_str(&format_fits(&output.ranked));

    out.push('\n');
    out.push_str(&format_summary(&output.summary));

    out
}

/// Fits table, one row per training curve, in the given order.
pub fn format_fits(fits: &[FitResult]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:<10} {:>12} {:>12} {:>10} {:>10}\n",
            "training", "ideal", "sse", "mse", "max_dev", "limit"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<10} {:-<12} {:-<12} {:-<10} {:-<10}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for f in fits {
        out.push_str(
            format!(
                "{:<10} {:<10} {:>12.4} {:>12.6} {:>10.4} {:>10.4}\n",
                truncate(&f.training_id, 10),
                truncate(&f.candidate_id, 10),
                f.sum_squared_error,
                f.mean_squared_error,
                f.max_abs_deviation,
                acceptance_limit(f.max_abs_deviation),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Matched/unmatched counts plus the per-function breakdown.
pub fn format_summary(summary: &AssignmentSummary) -> String {
    let mut out = format!(
        "Test points: {} matched, {} unmatched (of {})\n",
        summary.matched, summary.unmatched, summary.total
    );
    for (id, n) in &summary.per_candidate {
        out.push_str(&format!("  {id:<10} {n}\n"));
    }
    out
}

/// Assignment table in the `x, y_test, delta_y, ideal_function` layout.
///
/// `limit` caps the number of rows shown; the remainder is summarized.
pub fn format_assignments(rows: &[AssignmentResult], limit: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>10} {:>12} {:>10} {:<14}\n",
            "x", "y_test", "delta_y", "ideal_function"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:->10} {:->12} {:->10} {:-<14}\n", "", "", "", "").trim_end());
    out.push('\n');

    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    for r in &rows[..shown] {
        let delta = r.deviation.map(|d| format!("{d:.4}")).unwrap_or_else(|| "-".to_string());
        let ideal = r.matched_candidate_id.as_deref().unwrap_or("-");
        out.push_str(format!("{:>10.3} {:>12.4} {:>10} {:<14}\n", r.x, r.y, delta, truncate(ideal, 14)).trim_end());
        out.push('\n');
    }
    if shown < rows.len() {
        out.push_str(&format!("... {} more rows\n", rows.len() - shown));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
