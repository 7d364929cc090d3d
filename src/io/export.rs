//! Export fit and assignment tables to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts. Unmatched test points keep their row with empty result cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{AssignmentResult, FitResult};
use crate::error::AppError;

/// Write one row per fit.
pub fn write_fits_csv(path: &Path, fits: &[FitResult]) -> Result<(), AppError> {
    let file = create(path)?;
    write_fits(file, fits)
}

/// Write one row per test point, in input order.
pub fn write_assignments_csv(path: &Path, assignments: &[AssignmentResult]) -> Result<(), AppError> {
    let file = create(path)?;
    write_assignments(file, assignments)
}

pub fn write_fits<W: Write>(out: W, fits: &[FitResult]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    write_row(&mut writer, ["training_id", "candidate_id", "sse", "mse", "max_abs_deviation", "n_points"])?;

    for f in fits {
        write_row(
            &mut writer,
            [
                f.training_id.clone(),
                f.candidate_id.clone(),
                format!("{:.10}", f.sum_squared_error),
                format!("{:.10}", f.mean_squared_error),
                format!("{:.10}", f.max_abs_deviation),
                f.n_points.to_string(),
            ],
        )?;
    }

    flush(writer)
}

pub fn write_assignments<W: Write>(out: W, assignments: &[AssignmentResult]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    write_row(&mut writer, ["x", "y_test", "delta_y", "ideal_function", "score"])?;

    for a in assignments {
        write_row(
            &mut writer,
            [
                a.x.to_string(),
                a.y.to_string(),
                a.deviation.map(|v| format!("{v:.10}")).unwrap_or_default(),
                a.matched_candidate_id.clone().unwrap_or_default(),
                a.score.map(|v| format!("{v:.10}")).unwrap_or_default(),
            ],
        )?;
    }

    flush(writer)
}

fn write_row<W, I, T>(writer: &mut csv::Writer<W>, row: I) -> Result<(), AppError>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(row)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))
}

fn flush<W: Write>(mut writer: csv::Writer<W>) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TestPoint;

    #[test]
    fn fits_table_layout() {
        let fits = vec![FitResult {
            training_id: "y1".to_string(),
            candidate_id: "y42".to_string(),
            sum_squared_error: 80.0,
            mean_squared_error: 0.2,
            max_abs_deviation: 0.49,
            n_points: 400,
        }];

        let mut buf = Vec::new();
        write_fits(&mut buf, &fits).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "training_id,candidate_id,sse,mse,max_abs_deviation,n_points\n\
             y1,y42,80.0000000000,0.2000000000,0.4900000000,400\n"
        );
    }

    #[test]
    fn unmatched_rows_have_empty_cells() {
        let assignments = vec![
            AssignmentResult {
                x: 1.5,
                y: 2.0,
                matched_candidate_id: Some("y11".to_string()),
                deviation: Some(0.25),
                score: Some(0.5),
            },
            AssignmentResult::unmatched(TestPoint { x: -3.0, y: 9.0 }),
        ];

        let mut buf = Vec::new();
        write_assignments(&mut buf, &assignments).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x,y_test,delta_y,ideal_function,score");
        assert_eq!(lines[1], "1.5,2,0.2500000000,y11,0.5000000000");
        assert_eq!(lines[2], "-3,9,,,");
    }

    #[test]
    fn ids_with_commas_and_quotes_are_quoted() {
        let fits = vec![FitResult {
            training_id: "y,1".to_string(),
            candidate_id: "say \"hi\"".to_string(),
            sum_squared_error: 0.0,
            mean_squared_error: 0.0,
            max_abs_deviation: 0.0,
            n_points: 1,
        }];

        let mut buf = Vec::new();
        write_fits(&mut buf, &fits).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 6);
        assert_eq!(&rows[0][0], "y,1");
        assert_eq!(&rows[0][1], "say \"hi\"");
    }

    #[test]
    fn writes_files_to_disk() {
        let path = std::env::temp_dir().join(format!("cmap-export-{}.csv", std::process::id()));
        write_assignments_csv(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "x,y_test,delta_y,ideal_function,score\n");
        let _ = std::fs::remove_file(&path);
    }
}
