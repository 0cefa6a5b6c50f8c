//! Weight search orchestration.
//!
//! Responsibilities:
//!
//! - generate the discretized weight simplex
//! - evaluate each candidate weighting (parallel) and keep the max-R² one
//! - value the single-factor special cases

pub mod search;
pub mod special;
pub mod weight_grid;

pub use search::*;
pub use special::*;
pub use weight_grid::*;
