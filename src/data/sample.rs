//! Synthetic time-series table generation.
//!
//! Factor rates and the exchange rate follow independent log random walks.
//! Inflation is then built from the misalignment of a *known* weighting plus
//! Gaussian noise, so a search over the table has an answer to recover.

use chrono::{Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::TimeSeriesTable;
use crate::domain::{EXC_COLUMN, FACTOR_CODES, INF_COLUMN, ValuationMode, WeightVector};
use crate::error::AppError;
use crate::models::BasketValuator;

/// Starting level and monthly log-volatility per generated column.
const PATHS: [(&str, f64, f64); 4] = [
    ("USD", 1.0, 0.01),
    ("EUR", 0.9, 0.02),
    ("OIL", 60.0, 0.08),
    (EXC_COLUMN, 1.3, 0.015),
];

/// Intercept and slope of the inflation equation.
const INF_INTERCEPT: f64 = 0.02;
const INF_SLOPE: f64 = 0.4;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub periods: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Weighting the inflation series is generated from.
    pub true_weights: WeightVector,
    pub mode: ValuationMode,
    /// Standard deviation of the inflation noise.
    pub noise: f64,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub table: TimeSeriesTable,
    pub basket: Vec<String>,
    pub benchmark_date: NaiveDate,
    pub true_weights: WeightVector,
}

/// Generate a monthly table starting at `config.start`; the benchmark is the first date.
pub fn generate_table(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.periods < 3 {
        return Err(AppError::InvalidConfig("sample needs at least 3 periods".to_string()));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::InvalidConfig(format!(
            "invalid noise level {}",
            config.noise
        )));
    }

    let dates = (0..config.periods)
        .map(|i| {
            config
                .start
                .checked_add_months(Months::new(i as u32))
                .ok_or_else(|| AppError::InvalidConfig("sample dates overflow the calendar".to_string()))
        })
        .collect::<Result<Vec<NaiveDate>, AppError>>()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::InvalidConfig(format!("noise distribution error: {e}")))?;

    let mut table = TimeSeriesTable::new(dates)?;
    for (name, level, vol) in PATHS {
        let mut log_level = level.ln();
        let mut values = Vec::with_capacity(config.periods);
        for i in 0..config.periods {
            if i > 0 {
                log_level += vol * normal.sample(&mut rng);
            }
            values.push(log_level.exp());
        }
        table.insert_column(name, values)?;
    }

    let basket: Vec<String> = FACTOR_CODES.iter().map(|c| c.to_string()).collect();
    let benchmark_date = table.dates()[0];

    let ccbd = BasketValuator::new(&table, &basket, benchmark_date)
        .valuate(config.true_weights, config.mode)?;
    let inf: Vec<f64> = table
        .column(EXC_COLUMN)?
        .iter()
        .zip(ccbd.iter())
        .map(|(exc, c)| INF_INTERCEPT + INF_SLOPE * (exc - c) + config.noise * normal.sample(&mut rng))
        .collect();
    table.insert_column(INF_COLUMN, inf)?;

    Ok(SampleData {
        table,
        basket,
        benchmark_date,
        true_weights: config.true_weights,
    })
}
