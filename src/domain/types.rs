//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during valuation and grid search
//! - exported to JSON/CSV
//! - printed by the report module without reaching back into the calculator

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Codes the three-factor model keys its weights and reference values to.
///
/// The configured basket only decides which columns are summed; the weights
/// themselves are always `(USD, EUR, OIL)`.
pub const FACTOR_CODES: [&str; 3] = ["USD", "EUR", "OIL"];

/// Observed exchange rate column.
pub const EXC_COLUMN: &str = "EXC";

/// Inflation rate column (regression response).
pub const INF_COLUMN: &str = "INF";

/// Tolerance for simplex membership and "pure weight" classification.
pub const SIMPLEX_EPS: f64 = 1e-9;

/// Default discretization step of the weight grid.
pub const DEFAULT_STEP: f64 = 0.1;

/// Basket weights ordered `(USD, EUR, OIL)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub usd: f64,
    pub eur: f64,
    pub oil: f64,
}

impl WeightVector {
    pub const fn new(usd: f64, eur: f64, oil: f64) -> Self {
        Self { usd, eur, oil }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.usd, self.eur, self.oil]
    }

    pub fn sum(&self) -> f64 {
        self.usd + self.eur + self.oil
    }

    /// `(code, weight)` pairs in factor order.
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [
            (FACTOR_CODES[0], self.usd),
            (FACTOR_CODES[1], self.eur),
            (FACTOR_CODES[2], self.oil),
        ]
    }
}

impl std::fmt::Display for WeightVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(USD={:.2}, EUR={:.2}, OIL={:.2})",
            self.usd, self.eur, self.oil
        )
    }
}

/// How valuation coefficients evolve over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValuationMode {
    /// Coefficients frozen at the benchmark date.
    Fixed,
    /// Relative weights recomputed at every date against the contemporaneous rate.
    Variable,
}

impl ValuationMode {
    /// Column the winning misalignment series is written to.
    pub fn misalignment_column(self) -> &'static str {
        match self {
            ValuationMode::Fixed => "UNDERVALUATION_f",
            ValuationMode::Variable => "UNDERVALUATION_v",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ValuationMode::Fixed => "fixed",
            ValuationMode::Variable => "variable",
        }
    }
}

/// Which mode(s) a CLI run evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModeSpec {
    Fixed,
    Variable,
    Both,
}

impl ModeSpec {
    pub fn modes(self) -> Vec<ValuationMode> {
        match self {
            ModeSpec::Fixed => vec![ValuationMode::Fixed],
            ModeSpec::Variable => vec![ValuationMode::Variable],
            ModeSpec::Both => vec![ValuationMode::Fixed, ValuationMode::Variable],
        }
    }
}

/// What the grid search does when a single candidate fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Propagate the first failure (in enumeration order) and abort.
    #[default]
    Abort,
    /// Log the failure, record it, and continue with the next candidate.
    Skip,
}

/// Score of one evaluated grid candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Position in the enumeration order of the grid.
    pub index: usize,
    pub weights: WeightVector,
    pub r_squared: f64,
}

/// A candidate that failed under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCandidate {
    pub index: usize,
    pub weights: WeightVector,
    pub reason: String,
}

/// Result of the grid search: the max-R² weighting and everything needed to report it.
#[derive(Debug, Clone)]
pub struct OptimalWeights {
    pub mode: ValuationMode,
    pub weights: WeightVector,
    pub ccbd: Vec<f64>,
    pub misalignment: Vec<f64>,
    pub r_squared: f64,
    /// `[intercept, slope]` of `INF ~ 1 + misalignment`.
    pub coefficients: Vec<f64>,
    /// Every successfully evaluated candidate, in enumeration order.
    pub evaluated: Vec<CandidateScore>,
    pub skipped: Vec<SkippedCandidate>,
}

/// CCBD series for the three single-factor weightings.
///
/// A class with no matching grid candidate stays `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialCases {
    pub oil: Option<Vec<f64>>,
    pub eur: Option<Vec<f64>>,
    pub usd: Option<Vec<f64>>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus env/defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: Option<PathBuf>,
    pub benchmark_date: Option<NaiveDate>,
    pub basket: Vec<String>,
    pub modes: Vec<ValuationMode>,
    pub step: f64,
    pub failure_policy: FailurePolicy,
    pub top_n: usize,
    pub export_series: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            benchmark_date: None,
            basket: FACTOR_CODES.iter().map(|c| c.to_string()).collect(),
            modes: vec![ValuationMode::Fixed],
            step: DEFAULT_STEP,
            failure_policy: FailurePolicy::Abort,
            top_n: 10,
            export_series: None,
            export_json: None,
        }
    }
}

/// A saved search result (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub benchmark_date: NaiveDate,
    pub basket: Vec<String>,
    pub mode: ValuationMode,
    pub weights: WeightVector,
    pub r_squared: f64,
    pub coefficients: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub ccbd: Vec<f64>,
    pub misalignment: Vec<f64>,
}
