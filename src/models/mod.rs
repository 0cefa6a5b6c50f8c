//! Basket valuation model.
//!
//! Valuation is a small, pure view over the table so that the search and the
//! special-case evaluator can share it without cloning data.

pub mod basket;

pub use basket::*;
