//! `ccb-calculator` library crate.
//!
//! Values a weighted (USD, EUR, OIL) basket as a composite benchmark series
//! (CCBD) and searches a discretized weight simplex for the weighting whose
//! misalignment best explains inflation.
//!
//! The binary (`ccb`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (notebooks, other front-ends)

pub mod app;
pub mod calculator;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use calculator::CcbCalculator;
