//! Shared "search pipeline" logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> calculator -> grid -> search per mode -> rankings
//!
//! The command handlers can then focus on presentation and exports.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::calculator::CcbCalculator;
use crate::data::SampleData;
use crate::domain::{
    CandidateScore, EXC_COLUMN, FACTOR_CODES, INF_COLUMN, OptimalWeights, RunConfig,
    ValuationMode,
};
use crate::error::AppError;
use crate::io::ingest::{IngestedTable, RowError, load_table};
use crate::report::rank_candidates;

/// One searched mode: the result plus its top-N ranking.
#[derive(Debug, Clone)]
pub struct ModeOutput {
    pub result: OptimalWeights,
    pub ranked: Vec<CandidateScore>,
}

/// All computed outputs of a single `ccb search` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub calculator: CcbCalculator,
    pub modes: Vec<ModeOutput>,
    pub row_errors: Vec<RowError>,
}

/// Columns to load from the CSV: basket, the three factors, `EXC` and optionally `INF`.
pub fn required_columns(basket: &[String], with_inflation: bool) -> Vec<String> {
    let mut cols: Vec<String> = basket.to_vec();
    let extra = FACTOR_CODES
        .iter()
        .chain(std::iter::once(&EXC_COLUMN))
        .chain(with_inflation.then_some(&INF_COLUMN));
    for c in extra {
        if !cols.iter().any(|x| x == c) {
            cols.push(c.to_string());
        }
    }
    cols
}

/// Ingest the configured CSV and build a calculator over it.
pub fn load_calculator(
    config: &RunConfig,
    with_inflation: bool,
) -> Result<(CcbCalculator, IngestedTable), AppError> {
    let path = config
        .csv_path
        .as_deref()
        .ok_or_else(|| AppError::InvalidConfig("no CSV path given (--csv or CCB_CSV)".to_string()))?;
    let benchmark_date = config.benchmark_date.ok_or_else(|| {
        AppError::InvalidConfig("no benchmark date given (--benchmark-date or CCB_BENCHMARK_DATE)".to_string())
    })?;

    let columns = required_columns(&config.basket, with_inflation);
    let ingested = load_table(path, Some(columns.as_slice()))?;
    let calculator = CcbCalculator::new(ingested.table.clone(), config.basket.clone(), benchmark_date)?
        .with_step(config.step)?;
    Ok((calculator, ingested))
}

/// Execute the full search pipeline from the configured CSV.
pub fn run_search(config: &RunConfig) -> Result<RunOutput, AppError> {
    let (calculator, ingested) = load_calculator(config, true)?;
    run_search_with_calculator(config, calculator, ingested.row_errors)
}

/// Execute the search pipeline on a synthetic sample.
pub fn run_search_on_sample(config: &RunConfig, sample: SampleData) -> Result<RunOutput, AppError> {
    let calculator =
        CcbCalculator::new(sample.table, sample.basket, sample.benchmark_date)?.with_step(config.step)?;
    run_search_with_calculator(config, calculator, Vec::new())
}

/// Search every configured mode on an already-built calculator.
///
/// The grid comes from the calculator's own step, not `config.step`.
pub fn run_search_with_calculator(
    config: &RunConfig,
    mut calculator: CcbCalculator,
    row_errors: Vec<RowError>,
) -> Result<RunOutput, AppError> {
    if config.modes.is_empty() {
        return Err(AppError::InvalidConfig("no valuation mode selected".to_string()));
    }
    let grid = calculator.enumerate_grid();
    info!(candidates = grid.len(), step = calculator.step(), "weight grid ready");

    let mut modes = Vec::with_capacity(config.modes.len());
    for &mode in &config.modes {
        let result = calculator.search_with_policy(&grid, mode, config.failure_policy)?;
        let ranked = rank_candidates(&result.evaluated, config.top_n);
        modes.push(ModeOutput { result, ranked });
    }

    Ok(RunOutput {
        calculator,
        modes,
        row_errors,
    })
}

/// Export path for `mode`: unchanged for single-mode runs, `stem_mode.ext` otherwise.
pub fn export_path_for(path: &Path, mode: ValuationMode, multiple: bool) -> PathBuf {
    if !multiple {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ccb".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{}.{}", mode.display_name(), ext.to_string_lossy()),
        None => format!("{stem}_{}", mode.display_name()),
    };
    path.with_file_name(name)
}
