//! Weight grid generation.
//!
//! Candidate weightings are the points of a step-discretized simplex:
//! the Cartesian product of three level sets `{0, step, 2·step, …, 1}` filtered
//! to triples summing to 1.
//!
//! Enumeration order is the product order (USD outer, EUR middle, OIL inner).
//! The search breaks R² ties in favor of the earlier candidate, so this order
//! is part of the contract.
//!
//! The grid has `(n+1)(n+2)/2` points for `n = 1/step`, so `n` is capped at
//! [`MAX_GRID_DIVISIONS`].

use crate::domain::{SIMPLEX_EPS, WeightVector};
use crate::error::AppError;

/// Finest supported grid: `step >= 0.001`, about half a million candidates.
pub const MAX_GRID_DIVISIONS: usize = 1000;

/// Number of divisions `n = 1/step` for a step that divides 1.
pub fn grid_divisions(step: f64) -> Result<usize, AppError> {
    if !(step.is_finite() && step > 0.0 && step <= 1.0) {
        return Err(AppError::InvalidConfig(format!(
            "weight step must be in (0, 1], got {step}"
        )));
    }
    let n = (1.0 / step).round();
    if n > MAX_GRID_DIVISIONS as f64 {
        return Err(AppError::InvalidConfig(format!(
            "weight step {step} is finer than 1/{MAX_GRID_DIVISIONS}"
        )));
    }
    if (n * step - 1.0).abs() > SIMPLEX_EPS {
        return Err(AppError::InvalidConfig(format!(
            "weight step {step} does not divide 1"
        )));
    }
    Ok(n as usize)
}

/// All `(usd, eur, oil)` triples on the grid that sum to 1.
pub fn weight_grid(step: f64) -> Result<Vec<WeightVector>, AppError> {
    Ok(simplex_points(grid_divisions(step)?))
}

/// The standard 0.1-step grid (66 candidates).
pub fn default_grid() -> Vec<WeightVector> {
    simplex_points(10)
}

/// Simplex points with `n` divisions; OIL takes the remainder `n - i - j`.
///
/// Coordinates are computed as `k / n` rather than accumulated, so `0.3` is
/// the double closest to 0.3 and not `0.1 + 0.1 + 0.1`.
pub(crate) fn simplex_points(n: usize) -> Vec<WeightVector> {
    let scale = n as f64;
    let mut out = Vec::with_capacity((n + 1) * (n + 2) / 2);
    for i in 0..=n {
        for j in 0..=n - i {
            let k = n - i - j;
            out.push(WeightVector::new(
                i as f64 / scale,
                j as f64 / scale,
                k as f64 / scale,
            ));
        }
    }
    out
}
