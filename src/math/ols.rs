//! Ordinary least squares with an intercept.
//!
//! The grid search repeatedly solves tiny regressions of the form:
//!
//! ```text
//! INF_t = β0 + β1 * misalignment_t + ε_t
//! ```
//!
//! and only needs the coefficients and the (centered) R² back.
//!
//! Implementation choices:
//! - We solve through SVD so that tall design matrices are handled directly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Rank deficiency is detected from the singular values *before* solving:
//!   a constant regressor is collinear with the intercept and SVD would
//!   otherwise hand back a minimum-norm solution with a misleading R².

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

/// Relative singular-value floor below which the design is treated as singular.
const RANK_TOL: f64 = 1e-10;

/// Output of a single OLS fit.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// `[intercept, slope_1, ..., slope_k]`.
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub n_obs: usize,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Regress `y` on `[1, x]` and return coefficients and R².
pub fn fit_with_intercept(x: &[f64], y: &[f64]) -> Result<OlsFit, AppError> {
    fit_columns_with_intercept(&[x], y)
}

/// Regress `y` on `[1, x_1, ..., x_k]`.
pub fn fit_columns_with_intercept(columns: &[&[f64]], y: &[f64]) -> Result<OlsFit, AppError> {
    let n = y.len();
    let p = columns.len() + 1;

    if columns.iter().any(|c| c.len() != n) {
        return Err(AppError::DegenerateRegression(format!(
            "regressor length does not match response length {n}"
        )));
    }
    if n < p {
        return Err(AppError::DegenerateRegression(format!(
            "{n} observations for {p} parameters"
        )));
    }
    if y.iter().chain(columns.iter().flat_map(|c| c.iter())).any(|v| !v.is_finite()) {
        return Err(AppError::DegenerateRegression(
            "non-finite value in regression input".to_string(),
        ));
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    for i in 0..n {
        design[(i, 0)] = 1.0;
        for (j, col) in columns.iter().enumerate() {
            design[(i, j + 1)] = col[i];
        }
    }
    let response = DVector::from_column_slice(y);

    let singular = design.singular_values();
    let sv_max = singular.max();
    let sv_min = singular.min();
    if !(sv_max > 0.0) || sv_min <= sv_max * RANK_TOL {
        return Err(AppError::DegenerateRegression(format!(
            "design matrix is rank deficient (singular values {sv_min:.3e}..{sv_max:.3e})"
        )));
    }

    let beta = solve_least_squares(&design, &response).ok_or_else(|| {
        AppError::DegenerateRegression("least squares solve failed".to_string())
    })?;

    let mean = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    if !(tss > 0.0) {
        return Err(AppError::DegenerateRegression(
            "response has zero variance".to_string(),
        ));
    }

    let fitted = &design * &beta;
    let ssr: f64 = fitted
        .iter()
        .zip(y.iter())
        .map(|(f, v)| (v - f) * (v - f))
        .sum();

    let r_squared = 1.0 - ssr / tss;
    if !r_squared.is_finite() {
        return Err(AppError::DegenerateRegression("R² is not finite".to_string()));
    }

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        r_squared,
        n_obs: n,
    })
}
