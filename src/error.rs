//! Crate-wide error type.
//!
//! Every variant maps to a process exit code so the `ccb` binary can stay a
//! thin `match` over [`crate::app::run`].

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::WeightVector;

/// What kind of key was looked up and not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Date,
    Column,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyKind::Date => write!(f, "date"),
            KeyKind::Column => write!(f, "column"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Benchmark date or required column absent from the table.
    #[error("Missing {kind} '{key}' in time-series table.")]
    MissingKey { key: String, kind: KeyKind },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Io(String),

    /// Singular design matrix, zero-variance response or too few observations.
    #[error("Degenerate regression: {0}")]
    DegenerateRegression(String),

    /// The CCBD series contained an infinite or NaN value.
    #[error("Non-finite valuation for weights {weights} at {date}.")]
    NonFiniteValuation { weights: WeightVector, date: NaiveDate },

    #[error("Weight grid is empty; nothing to search.")]
    EmptyGrid,

    #[error("No valid candidates: all {skipped} candidates failed.")]
    NoValidCandidates { skipped: usize },

    #[error("No valid rows remain after ingest.")]
    EmptyTable,
}

impl AppError {
    pub fn missing_column(name: impl Into<String>) -> Self {
        AppError::MissingKey {
            key: name.into(),
            kind: KeyKind::Column,
        }
    }

    pub fn missing_date(date: NaiveDate) -> Self {
        AppError::MissingKey {
            key: date.to_string(),
            kind: KeyKind::Date,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MissingKey { .. } | AppError::InvalidConfig(_) | AppError::Io(_) => 2,
            AppError::EmptyGrid | AppError::EmptyTable => 3,
            AppError::DegenerateRegression(_)
            | AppError::NonFiniteValuation { .. }
            | AppError::NoValidCandidates { .. } => 4,
        }
    }
}
