//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model constants (`FACTOR_CODES`, `EXC_COLUMN`, `INF_COLUMN`, `SIMPLEX_EPS`)
//! - weight vectors and valuation modes (`WeightVector`, `ValuationMode`)
//! - search outputs (`OptimalWeights`, `CandidateScore`, `SpecialCases`)
//! - run configuration (`RunConfig`)

pub mod types;

pub use types::*;
