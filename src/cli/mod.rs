//! Command-line parsing for the CCB weight calculator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the valuation/search code.
//!
//! Data-location flags can also come from the environment (`CCB_CSV`,
//! `CCB_BENCHMARK_DATE`); a `.env` file is loaded before parsing.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_STEP, ModeSpec, ValuationMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ccb", version, about = "Composite benchmark (CCB) basket weight search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the weight grid for the max-R² basket and print diagnostics.
    Search(SearchArgs),
    /// Value the pure OIL / EUR / USD baskets.
    Special(SpecialArgs),
    /// Print the weight grid.
    Grid(GridArgs),
    /// Run the search on a seeded synthetic table.
    Demo(DemoArgs),
}

/// Where the table comes from and how it is interpreted.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Time-series CSV (`date` column plus one numeric column per series).
    #[arg(long, env = "CCB_CSV", value_name = "CSV")]
    pub csv: PathBuf,

    /// Benchmark date (YYYY-MM-DD); must be a date in the table.
    #[arg(long, env = "CCB_BENCHMARK_DATE")]
    pub benchmark_date: NaiveDate,

    /// Basket codes summed into the CCBD series.
    #[arg(long, value_delimiter = ',', default_value = "USD,EUR,OIL")]
    pub basket: Vec<String>,

    /// Weight grid step; must divide 1.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: f64,
}

/// Options shared by the search-style commands.
#[derive(Debug, Args, Clone)]
pub struct SearchOptions {
    /// Valuation mode(s) to search.
    #[arg(long, value_enum, default_value_t = ModeSpec::Both)]
    pub mode: ModeSpec,

    /// Skip candidates that fail (logged) instead of aborting the search.
    #[arg(long)]
    pub skip_failed: bool,

    /// Show the top-N candidates by R².
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export date/EXC/INF/CCBD/misalignment rows of the winner to CSV.
    ///
    /// With `--mode both` the mode name is appended to the file stem.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the result(s) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub search: SearchOptions,
}

#[derive(Debug, Args, Clone)]
pub struct SpecialArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Valuation mode.
    #[arg(long, value_enum, default_value_t = ValuationMode::Fixed)]
    pub mode: ValuationMode,
}

#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Weight grid step; must divide 1.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: f64,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of monthly periods to generate.
    #[arg(long, default_value_t = 120)]
    pub periods: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date of the synthetic table (also the benchmark date).
    #[arg(long, default_value = "2010-01-01")]
    pub start: NaiveDate,

    /// Hidden weighting (USD,EUR,OIL) the inflation series is generated from.
    #[arg(long, value_delimiter = ',', default_values_t = [0.3, 0.5, 0.2])]
    pub weights: Vec<f64>,

    /// Standard deviation of the inflation noise.
    #[arg(long, default_value_t = 0.001)]
    pub noise: f64,

    /// Weight grid step; must divide 1.
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub step: f64,

    #[command(flatten)]
    pub search: SearchOptions,
}
