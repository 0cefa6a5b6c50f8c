//! `CcbCalculator`: the table, basket and benchmark date bundled behind the
//! four public operations (valuate, enumerate grid, search, special cases).
//!
//! The calculator owns its table. Every operation reads it, and `search`
//! additionally writes the winning misalignment series into the
//! mode-specific column (`UNDERVALUATION_f` / `UNDERVALUATION_v`). Callers
//! that need the original table untouched should clone it before searching.

use chrono::NaiveDate;
use tracing::debug;

use crate::data::TimeSeriesTable;
use crate::domain::{
    DEFAULT_STEP, EXC_COLUMN, FACTOR_CODES, FailurePolicy, OptimalWeights, SpecialCases,
    ValuationMode, WeightVector,
};
use crate::error::AppError;
use crate::fit::weight_grid::simplex_points;
use crate::fit::{grid_divisions, search_optimal, special_cases};
use crate::models::BasketValuator;

#[derive(Debug, Clone)]
pub struct CcbCalculator {
    table: TimeSeriesTable,
    basket: Vec<String>,
    benchmark_date: NaiveDate,
    /// Grid resolution, `1 / step`.
    divisions: usize,
}

impl CcbCalculator {
    /// Validate the table contract and build a calculator.
    ///
    /// Requires the benchmark date in the index and the basket, `EXC` and
    /// `USD`/`EUR`/`OIL` columns. `INF` is only checked when a search starts.
    /// The grid step starts at [`DEFAULT_STEP`]; see [`with_step`](Self::with_step).
    pub fn new(
        table: TimeSeriesTable,
        basket: Vec<String>,
        benchmark_date: NaiveDate,
    ) -> Result<Self, AppError> {
        if basket.is_empty() {
            return Err(AppError::InvalidConfig("basket is empty".to_string()));
        }
        table.row_index(benchmark_date)?;
        table.require_columns(basket.as_slice())?;
        table.require_columns(&FACTOR_CODES)?;
        table.require_columns(&[EXC_COLUMN])?;

        debug!(
            dates = table.len(),
            basket = ?basket,
            %benchmark_date,
            "calculator ready"
        );

        Ok(Self {
            table,
            basket,
            benchmark_date,
            divisions: grid_divisions(DEFAULT_STEP)?,
        })
    }

    /// Set the weight grid step used by [`enumerate_grid`](Self::enumerate_grid).
    pub fn with_step(mut self, step: f64) -> Result<Self, AppError> {
        self.divisions = grid_divisions(step)?;
        Ok(self)
    }

    pub fn table(&self) -> &TimeSeriesTable {
        &self.table
    }

    pub fn basket(&self) -> &[String] {
        &self.basket
    }

    pub fn benchmark_date(&self) -> NaiveDate {
        self.benchmark_date
    }

    pub fn step(&self) -> f64 {
        1.0 / self.divisions as f64
    }

    fn valuator(&self) -> BasketValuator<'_> {
        BasketValuator::new(&self.table, &self.basket, self.benchmark_date)
    }

    /// CCBD series for `weights` under `mode`, in table date order.
    pub fn valuate(&self, weights: WeightVector, mode: ValuationMode) -> Result<Vec<f64>, AppError> {
        self.valuator().valuate(weights, mode)
    }

    /// Candidate weightings at the configured step (0.1 gives the standard
    /// 66-point grid).
    pub fn enumerate_grid(&self) -> Vec<WeightVector> {
        simplex_points(self.divisions)
    }

    /// Max-R² search with the abort-on-first-failure policy.
    pub fn search(
        &mut self,
        grid: &[WeightVector],
        mode: ValuationMode,
    ) -> Result<OptimalWeights, AppError> {
        self.search_with_policy(grid, mode, FailurePolicy::Abort)
    }

    /// Max-R² search; on success writes the winner's misalignment into
    /// `mode.misalignment_column()`. The table is left untouched on error.
    pub fn search_with_policy(
        &mut self,
        grid: &[WeightVector],
        mode: ValuationMode,
        policy: FailurePolicy,
    ) -> Result<OptimalWeights, AppError> {
        let result = search_optimal(&self.valuator(), grid, mode, policy)?;
        self.table
            .insert_column(mode.misalignment_column(), result.misalignment.clone())?;
        Ok(result)
    }

    /// CCBD series for the pure OIL / EUR / USD candidates of `grid`.
    pub fn special_cases(
        &self,
        grid: &[WeightVector],
        mode: ValuationMode,
    ) -> Result<SpecialCases, AppError> {
        special_cases(&self.valuator(), grid, mode)
    }
}
