//! CSV ingest and normalization.
//!
//! Two table shapes are read:
//!
//! - wide curve tables (`x, y1, y2, ...`): the training set and the candidate pool
//! - point tables (`x, y`): the test data
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (column and row order are preserved)
//! - **Separation of concerns**: no matching logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{CandidatePool, Curve, Sample, TestPoint, TrainingSet};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// A wide table of curves sharing its `x` column.
#[derive(Debug, Clone)]
pub struct CurveTable {
    pub curves: Vec<Curve>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl CurveTable {
    pub fn into_training_set(self) -> TrainingSet {
        TrainingSet::new(self.curves)
    }

    pub fn into_pool(self) -> CandidatePool {
        CandidatePool::new(self.curves)
    }
}

/// Test points in file order.
#[derive(Debug, Clone)]
pub struct TestTable {
    pub points: Vec<TestPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a wide curve CSV; columns whose name starts with `prefix` become curves.
pub fn load_curve_table(path: &Path, prefix: &str) -> Result<CurveTable, AppError> {
    let file = open(path)?;
    let table = read_curve_table(file, prefix)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    info!(
        path = %path.display(),
        curves = table.curves.len(),
        rows = table.rows_used,
        "loaded curve table"
    );
    log_row_errors(path, &table.row_errors);
    Ok(table)
}

/// Load an `x, y` test-point CSV.
pub fn load_test_points(path: &Path) -> Result<TestTable, AppError> {
    let file = open(path)?;
    let table = read_test_points(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), points = table.rows_used, "loaded test points");
    log_row_errors(path, &table.row_errors);
    Ok(table)
}

/// Parse a wide curve table from any reader.
pub fn read_curve_table<R: Read>(reader: R, prefix: &str) -> Result<CurveTable, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let x_idx = *header_map
        .get("x")
        .ok_or_else(|| AppError::new(2, "Missing required column: `x`"))?;

    let prefix = prefix.trim().to_ascii_lowercase();
    let columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|&(idx, name)| idx != x_idx && normalize_header_name(name).starts_with(&prefix))
        .map(|(idx, name)| (idx, clean_header_name(name).to_string()))
        .collect();

    if columns.is_empty() {
        return Err(AppError::new(
            2,
            format!("No curve columns found with prefix `{prefix}`."),
        ));
    }

    // Curves are referred to by id downstream, so ids must be unique.
    for (i, (_, name)) in columns.iter().enumerate() {
        if columns[..i].iter().any(|(_, other)| other == name) {
            return Err(AppError::new(2, format!("Duplicate curve column: `{name}`")));
        }
    }

    let mut samples: Vec<Vec<Sample>> = vec![Vec::new(); columns.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_used = 0usize;
    let mut row_y = Vec::with_capacity(columns.len());

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let x = match get_f64(&record, x_idx, "x") {
            Ok(v) => v,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        row_y.clear();
        let parsed: Result<(), String> = columns.iter().try_for_each(|(col_idx, name)| {
            row_y.push(get_f64(&record, *col_idx, name)?);
            Ok(())
        });
        if let Err(message) = parsed {
            row_errors.push(RowError { line, message });
            continue;
        }

        for (curve_samples, &y) in samples.iter_mut().zip(row_y.iter()) {
            curve_samples.push(Sample { x, y });
        }
        rows_used += 1;
    }

    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows in curve table."));
    }

    let curves = columns
        .into_iter()
        .zip(samples)
        .map(|((_, name), samples)| Curve::new(name, samples))
        .collect();

    Ok(CurveTable {
        curves,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Parse an `x, y` point table from any reader.
pub fn read_test_points<R: Read>(reader: R) -> Result<TestTable, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let x_idx = *header_map
        .get("x")
        .ok_or_else(|| AppError::new(2, "Missing required column: `x`"))?;
    let y_idx = *header_map
        .get("y")
        .ok_or_else(|| AppError::new(2, "Missing required column: `y`"))?;

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| {
                Ok(TestPoint {
                    x: get_f64(&record, x_idx, "x")?,
                    y: get_f64(&record, y_idx, "y")?,
                })
            });

        match parsed {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = points.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows in test table."));
    }

    Ok(TestTable {
        points,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn log_row_errors(path: &Path, row_errors: &[RowError]) {
    if row_errors.is_empty() {
        return;
    }
    warn!(path = %path.display(), skipped = row_errors.len(), "skipped invalid rows");
    for e in row_errors.iter().take(5) {
        warn!(line = e.line, "{}", e.message);
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn clean_header_name(name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿x"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    name.trim().trim_start_matches('\u{feff}')
}

fn normalize_header_name(name: &str) -> String {
    clean_header_name(name).to_ascii_lowercase()
}

fn get_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("Non-finite value for `{name}`: '{raw}'"));
    }
    Ok(v)
}
