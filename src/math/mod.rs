//! Mathematical utilities: key-aligned map arithmetic and least squares.

pub mod ols;
pub mod weights;

pub use ols::*;
pub use weights::*;
