//! Time-series data: the date-indexed table and a seeded synthetic generator.

pub mod sample;
pub mod table;

pub use sample::*;
pub use table::*;
