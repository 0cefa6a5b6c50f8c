//! Single-factor ("pure") weightings.
//!
//! A grid candidate is pure OIL, pure EUR or pure USD when the corresponding
//! component equals 1. Classes are checked in that order and are mutually
//! exclusive. Each matching candidate is valued with `(weights, mode)`; when
//! several candidates land in the same class the last one evaluated is kept.

use crate::domain::{SIMPLEX_EPS, SpecialCases, ValuationMode, WeightVector};
use crate::error::AppError;
use crate::models::BasketValuator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PureFactor {
    Oil,
    Eur,
    Usd,
}

impl PureFactor {
    pub fn display_name(self) -> &'static str {
        match self {
            PureFactor::Oil => "OIL",
            PureFactor::Eur => "EUR",
            PureFactor::Usd => "USD",
        }
    }
}

/// Which pure class `weights` belongs to, if any.
pub fn classify(weights: WeightVector) -> Option<PureFactor> {
    let is_one = |x: f64| (x - 1.0).abs() < SIMPLEX_EPS;
    if is_one(weights.oil) {
        Some(PureFactor::Oil)
    } else if is_one(weights.eur) {
        Some(PureFactor::Eur)
    } else if is_one(weights.usd) {
        Some(PureFactor::Usd)
    } else {
        None
    }
}

/// CCBD series for each pure weighting present in `grid`.
pub fn special_cases(
    valuator: &BasketValuator<'_>,
    grid: &[WeightVector],
    mode: ValuationMode,
) -> Result<SpecialCases, AppError> {
    let mut out = SpecialCases::default();
    for &weights in grid {
        let Some(class) = classify(weights) else {
            continue;
        };
        let ccbd = valuator.valuate(weights, mode)?;
        match class {
            PureFactor::Oil => out.oil = Some(ccbd),
            PureFactor::Eur => out.eur = Some(ccbd),
            PureFactor::Usd => out.usd = Some(ccbd),
        }
    }
    Ok(out)
}
