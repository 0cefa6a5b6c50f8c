//! Basket valuation: the implied composite benchmark (CCBD) series.
//!
//! Two modes:
//!
//! - **fixed**: relative weights are frozen at the benchmark date and scaled by
//!   the benchmark exchange rate, giving one absolute coefficient per code:
//!
//!   ```text
//!   coef[c]  = w[c] / X_c(bd) * EXC(bd)
//!   CCBD(t)  = Σ_c coef[c] * X_c(t)
//!   ```
//!
//! - **variable**: relative weights are recomputed at every date and scaled by
//!   the contemporaneous exchange rate:
//!
//!   ```text
//!   CCBD(t)  = Σ_c w[c] / X_c(t) * EXC(t)
//!   ```
//!
//! Weights are always keyed to `(USD, EUR, OIL)`; the basket decides which of
//! those codes take part in the sum. Weight values are not range-checked.

use chrono::NaiveDate;

use crate::data::TimeSeriesTable;
use crate::domain::{EXC_COLUMN, FACTOR_CODES, ValuationMode, WeightVector};
use crate::error::AppError;
use crate::math::{WeightMap, divide_maps, multiply_maps, scale_map, sum_values};

/// Read-only view of the inputs valuation needs.
#[derive(Debug, Clone, Copy)]
pub struct BasketValuator<'a> {
    table: &'a TimeSeriesTable,
    basket: &'a [String],
    benchmark_date: NaiveDate,
}

impl<'a> BasketValuator<'a> {
    pub fn new(table: &'a TimeSeriesTable, basket: &'a [String], benchmark_date: NaiveDate) -> Self {
        Self {
            table,
            basket,
            benchmark_date,
        }
    }

    pub fn table(&self) -> &'a TimeSeriesTable {
        self.table
    }

    pub fn basket(&self) -> &'a [String] {
        self.basket
    }

    pub fn benchmark_date(&self) -> NaiveDate {
        self.benchmark_date
    }

    /// CCBD series for `weights`, one value per table date.
    ///
    /// Fails with `NonFiniteValuation` at the first date whose value is not
    /// finite (e.g. a zero reference rate).
    pub fn valuate(&self, weights: WeightVector, mode: ValuationMode) -> Result<Vec<f64>, AppError> {
        let weight_map = weight_map(weights);
        let reference = self.reference_row()?;

        let ccbd = match mode {
            ValuationMode::Fixed => {
                let relative = divide_maps(&weight_map, &reference);
                let exc_bd = self.table.value(self.benchmark_date, EXC_COLUMN)?;
                let coefficients = scale_map(&relative, exc_bd);
                (0..self.table.len())
                    .map(|i| sum_values(&multiply_maps(&coefficients, &self.table.row(i, self.basket))))
                    .collect::<Vec<f64>>()
            }
            ValuationMode::Variable => {
                let exc = self.table.column(EXC_COLUMN)?;
                (0..self.table.len())
                    .map(|i| {
                        let relative = divide_maps(&weight_map, &self.table.row(i, self.basket));
                        sum_values(&scale_map(&relative, exc[i]))
                    })
                    .collect::<Vec<f64>>()
            }
        };

        if let Some(i) = ccbd.iter().position(|v| !v.is_finite()) {
            return Err(AppError::NonFiniteValuation {
                weights,
                date: self.table.dates()[i],
            });
        }

        Ok(ccbd)
    }

    /// `(USD, EUR, OIL)` at the benchmark date.
    ///
    /// Looked up in both modes: the factor columns are part of the table
    /// contract regardless of the configured basket.
    fn reference_row(&self) -> Result<WeightMap, AppError> {
        let i = self.table.row_index(self.benchmark_date)?;
        FACTOR_CODES
            .iter()
            .map(|code| -> Result<(String, f64), AppError> {
                Ok((code.to_string(), self.table.column(code)?[i]))
            })
            .collect()
    }
}

fn weight_map(weights: WeightVector) -> WeightMap {
    weights
        .entries()
        .iter()
        .map(|(code, w)| (code.to_string(), *w))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn basket() -> Vec<String> {
        FACTOR_CODES.iter().map(|c| c.to_string()).collect()
    }

    pub(crate) fn two_date_table() -> TimeSeriesTable {
        TimeSeriesTable::new(vec![d(2020, 1, 1), d(2020, 2, 1)])
            .unwrap()
            .with_column("USD", vec![1.0, 1.05])
            .unwrap()
            .with_column("EUR", vec![0.9, 0.95])
            .unwrap()
            .with_column("OIL", vec![50.0, 55.0])
            .unwrap()
            .with_column("EXC", vec![1.2, 1.25])
            .unwrap()
    }

    #[test]
    fn fixed_mode_freezes_benchmark_coefficients() {
        let table = two_date_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(2020, 1, 1));
        let ccbd = v.valuate(WeightVector::new(1.0, 0.0, 0.0), ValuationMode::Fixed).unwrap();
        assert_eq!(ccbd.len(), 2);
        assert_relative_eq!(ccbd[0], 1.2, epsilon = 1e-12);
        assert_relative_eq!(ccbd[1], 1.26, epsilon = 1e-12);
    }

    #[test]
    fn variable_mode_uses_contemporaneous_rates() {
        let table = two_date_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(2020, 1, 1));
        let ccbd = v
            .valuate(WeightVector::new(1.0, 0.0, 0.0), ValuationMode::Variable)
            .unwrap();
        assert_relative_eq!(ccbd[0], 1.2, epsilon = 1e-12);
        assert_relative_eq!(ccbd[1], 1.25 / 1.05, epsilon = 1e-12);
        assert!((ccbd[1] - 1.190476).abs() < 1e-6);
    }

    #[test]
    fn mixed_weights_sum_over_basket() {
        let table = two_date_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(2020, 1, 1));
        let w = WeightVector::new(0.2, 0.3, 0.5);
        let ccbd = v.valuate(w, ValuationMode::Fixed).unwrap();
        let expected_t1 = 1.2 * (0.2 / 1.0 * 1.05 + 0.3 / 0.9 * 0.95 + 0.5 / 50.0 * 55.0);
        assert_relative_eq!(ccbd[0], 1.2, epsilon = 1e-12);
        assert_relative_eq!(ccbd[1], expected_t1, epsilon = 1e-12);
    }

    #[test]
    fn basket_restricts_summation_set() {
        let table = two_date_table();
        let basket = vec!["USD".to_string()];
        let v = BasketValuator::new(&table, &basket, d(2020, 1, 1));
        let ccbd = v
            .valuate(WeightVector::new(0.5, 0.5, 0.0), ValuationMode::Fixed)
            .unwrap();
        // Only the USD leg contributes.
        assert_relative_eq!(ccbd[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(ccbd[1], 0.5 * 1.2 * 1.05, epsilon = 1e-12);
    }

    #[test]
    fn valuation_is_idempotent() {
        let table = two_date_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(2020, 2, 1));
        let w = WeightVector::new(0.1, 0.6, 0.3);
        for mode in [ValuationMode::Fixed, ValuationMode::Variable] {
            assert_eq!(v.valuate(w, mode).unwrap(), v.valuate(w, mode).unwrap());
        }
    }

    #[test]
    fn zero_reference_rate_is_non_finite() {
        let mut table = two_date_table();
        table.insert_column("OIL", vec![0.0, 55.0]).unwrap();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(2020, 1, 1));
        let err = v
            .valuate(WeightVector::new(0.0, 0.0, 1.0), ValuationMode::Fixed)
            .unwrap_err();
        match err {
            AppError::NonFiniteValuation { date, .. } => assert_eq!(date, d(2020, 1, 1)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_rate_off_the_benchmark_date_fails_variable_mode() {
        let mut table = two_date_table();
        table.insert_column("OIL", vec![50.0, 0.0]).unwrap();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(2020, 1, 1));

        // w/0 is infinite and 0/0 is NaN: both legs poison the sum.
        for w in [WeightVector::new(0.2, 0.3, 0.5), WeightVector::new(1.0, 0.0, 0.0)] {
            match v.valuate(w, ValuationMode::Variable).unwrap_err() {
                AppError::NonFiniteValuation { weights, date } => {
                    assert_eq!(weights, w);
                    assert_eq!(date, d(2020, 2, 1));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        // Fixed mode only divides by the benchmark row.
        let fixed = v
            .valuate(WeightVector::new(0.0, 0.0, 1.0), ValuationMode::Fixed)
            .unwrap();
        assert_relative_eq!(fixed[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_benchmark_date_is_missing_key() {
        let table = two_date_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, d(1999, 1, 1));
        let err = v
            .valuate(WeightVector::new(1.0, 0.0, 0.0), ValuationMode::Variable)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingKey { .. }));
    }
}
