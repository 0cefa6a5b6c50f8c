//! Export search results to CSV (per-date series) and JSON (result file).
//!
//! The CSV export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::data::TimeSeriesTable;
use crate::domain::{EXC_COLUMN, INF_COLUMN, OptimalWeights, ResultFile};
use crate::error::AppError;

/// Write `date, EXC, INF, CCBD, misalignment` rows for the winning weighting.
pub fn write_series_csv(
    path: &Path,
    table: &TimeSeriesTable,
    result: &OptimalWeights,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let exc = table.column(EXC_COLUMN)?;
    let inf = table.column(INF_COLUMN)?;
    let mode = result.mode.display_name();

    writer
        .write_record(["date", "mode", "exc", "inf", "ccbd", "misalignment"])
        .map_err(|e| AppError::Io(format!("Failed to write export CSV header: {e}")))?;

    for (i, date) in table.dates().iter().enumerate() {
        writer
            .write_record([
                date.to_string(),
                mode.to_string(),
                format!("{:.10}", exc[i]),
                format!("{:.10}", inf[i]),
                format!("{:.10}", result.ccbd[i]),
                format!("{:.10}", result.misalignment[i]),
            ])
            .map_err(|e| AppError::Io(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::Io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Build the portable JSON representation of a search result.
pub fn result_file(
    table: &TimeSeriesTable,
    basket: &[String],
    benchmark_date: chrono::NaiveDate,
    result: &OptimalWeights,
) -> ResultFile {
    ResultFile {
        tool: "ccb".to_string(),
        benchmark_date,
        basket: basket.to_vec(),
        mode: result.mode,
        weights: result.weights,
        r_squared: result.r_squared,
        coefficients: result.coefficients.clone(),
        dates: table.dates().to_vec(),
        ccbd: result.ccbd.clone(),
        misalignment: result.misalignment.clone(),
    }
}

/// Write one or more result files as a JSON array.
pub fn write_result_json(path: &Path, results: &[ResultFile]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, results)
        .map_err(|e| AppError::Io(format!("Failed to write result JSON: {e}")))?;
    Ok(())
}
