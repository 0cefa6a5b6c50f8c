//! CSV ingest into a [`TimeSeriesTable`].
//!
//! Expected layout: one `date` column (any case) and one numeric column per
//! series, e.g.
//!
//! ```text
//! date,USD,EUR,OIL,EXC,INF
//! 2015-01-01,1.0,0.89,47.8,1.21,0.031
//! ```
//!
//! Design goals:
//! - **Strict schema** for requested columns (clear `MissingKey` errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic output** (rows sorted by date, duplicates rejected)
//! - **Separation of concerns**: no valuation logic here

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::data::TimeSeriesTable;
use crate::error::AppError;

const DATE_COLUMN: &str = "date";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what was dropped on the way.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: TimeSeriesTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a CSV file.
///
/// With `columns = Some(..)` only those series are loaded (other columns may
/// hold anything); with `None` every non-date column must be numeric.
pub fn load_table(path: &Path, columns: Option<&[String]>) -> Result<IngestedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_table(file, columns)?;
    info!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used,
        row_errors = ingested.row_errors.len(),
        "loaded time-series table"
    );
    Ok(ingested)
}

/// Same as [`load_table`] over any reader.
pub fn read_table<R: Read>(reader: R, columns: Option<&[String]>) -> Result<IngestedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Io(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let (date_idx, series) = resolve_columns(&headers, columns)?;

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    let mut seen = HashSet::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, date_idx, &series));

        match parsed {
            Ok((date, _)) if !seen.insert(date) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Duplicate date {date}."),
                });
            }
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        warn!(line = e.line, "skipping row: {}", e.message);
    }

    if rows.is_empty() {
        return Err(AppError::EmptyTable);
    }

    rows.sort_by_key(|(date, _)| *date);
    let rows_used = rows.len();

    let dates = rows.iter().map(|(d, _)| *d).collect();
    let mut table = TimeSeriesTable::new(dates)?;
    for (j, (name, _)) in series.iter().enumerate() {
        table.insert_column(name, rows.iter().map(|(_, values)| values[j]).collect())?;
    }

    Ok(IngestedTable {
        table,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Locate the date column and the `(name, index)` of every series to load.
fn resolve_columns(
    headers: &StringRecord,
    columns: Option<&[String]>,
) -> Result<(usize, Vec<(String, usize)>), AppError> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let date_idx = names
        .iter()
        .position(|n| n.eq_ignore_ascii_case(DATE_COLUMN))
        .ok_or_else(|| AppError::missing_column(DATE_COLUMN))?;

    let series = match columns {
        Some(wanted) => {
            let by_name: HashMap<&str, usize> =
                names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
            let mut out = Vec::with_capacity(wanted.len());
            for name in wanted {
                if out.iter().any(|(n, _): &(String, usize)| n == name) {
                    continue;
                }
                let idx = by_name
                    .get(name.as_str())
                    .ok_or_else(|| AppError::missing_column(name.as_str()))?;
                out.push((name.clone(), *idx));
            }
            out
        }
        None => names
            .iter()
            .enumerate()
            .filter(|(i, n)| *i != date_idx && !n.is_empty())
            .map(|(i, n)| (n.clone(), i))
            .collect(),
    };

    Ok((date_idx, series))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    series: &[(String, usize)],
) -> Result<(NaiveDate, Vec<f64>), String> {
    let raw_date = get_required(record, date_idx, DATE_COLUMN)?;
    let date = parse_date(raw_date)?;

    let mut values = Vec::with_capacity(series.len());
    for (name, idx) in series {
        let raw = get_required(record, *idx, name)?;
        let v = raw
            .parse::<f64>()
            .map_err(|_| format!("Invalid number '{raw}' in `{name}`."))?;
        if !v.is_finite() {
            return Err(format!("Non-finite value '{raw}' in `{name}`."));
        }
        values.push(v);
    }
    Ok((date, values))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are preferred; monthly series are often exported as `YYYY-MM`,
    // which we read as the first of the month.
    // Day-first and month-first slash dates are indistinguishable, so neither is accepted.
    const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(d);
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, YYYY-MM."
    ))
}
