//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the tracing subscriber
//! - parses CLI arguments
//! - runs ingest + grid search / special cases
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DataArgs, DemoArgs, GridArgs, SearchArgs, SearchOptions, SpecialArgs};
use crate::data::{SampleConfig, generate_table};
use crate::domain::{FailurePolicy, RunConfig, WeightVector};
use crate::error::AppError;
use crate::fit::weight_grid;

pub mod pipeline;

/// Entry point for the `ccb` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; flags and the process environment still apply.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Search(args) => handle_search(args),
        Command::Special(args) => handle_special(args),
        Command::Grid(args) => handle_grid(args),
        Command::Demo(args) => handle_demo(args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // `try_init` so repeated calls (tests, embedding) do not panic.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_search(args: SearchArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.data, &args.search);
    let run = pipeline::run_search(&config)?;
    print_run(&config, &run)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let [usd, eur, oil] = <[f64; 3]>::try_from(args.weights.as_slice()).map_err(|_| {
        AppError::InvalidConfig(format!(
            "--weights needs exactly 3 values (USD,EUR,OIL), got {}",
            args.weights.len()
        ))
    })?;
    let true_weights = WeightVector::new(usd, eur, oil);

    let mut config = run_config_from_search_options(&args.search);
    config.step = args.step;

    // The hidden weighting drives inflation through the first searched mode.
    let sample_mode = config
        .modes
        .first()
        .copied()
        .unwrap_or(crate::domain::ValuationMode::Fixed);
    let sample = generate_table(&SampleConfig {
        periods: args.periods,
        seed: args.seed,
        start: args.start,
        true_weights,
        mode: sample_mode,
        noise: args.noise,
    })?;

    println!("Synthetic table: seed={} | hidden weights {true_weights} ({})\n", args.seed, sample_mode.display_name());
    let run = pipeline::run_search_on_sample(&config, sample)?;
    print_run(&config, &run)
}

fn handle_special(args: SpecialArgs) -> Result<(), AppError> {
    let config = RunConfig {
        csv_path: Some(args.data.csv.clone()),
        benchmark_date: Some(args.data.benchmark_date),
        basket: args.data.basket.clone(),
        step: args.data.step,
        ..RunConfig::default()
    };
    let (calculator, _) = pipeline::load_calculator(&config, false)?;
    let grid = calculator.enumerate_grid();
    let cases = calculator.special_cases(&grid, args.mode)?;

    println!(
        "{}",
        crate::report::format_run_header(calculator.table(), calculator.basket(), calculator.benchmark_date())
    );
    println!("{}", crate::report::format_special_cases(&cases, args.mode));
    Ok(())
}

fn handle_grid(args: GridArgs) -> Result<(), AppError> {
    let grid = weight_grid(args.step)?;
    print!("{}", crate::report::format_grid(&grid));
    Ok(())
}

fn print_run(config: &RunConfig, run: &pipeline::RunOutput) -> Result<(), AppError> {
    let calc = &run.calculator;
    println!(
        "{}",
        crate::report::format_run_header(calc.table(), calc.basket(), calc.benchmark_date())
    );
    if !run.row_errors.is_empty() {
        println!("Skipped {} CSV row(s); run with RUST_LOG=warn for details.", run.row_errors.len());
    }

    for mode_output in &run.modes {
        println!("{}", crate::report::format_search_summary(&mode_output.result));
        println!("Top candidates:");
        println!("{}", crate::report::format_candidates(&mode_output.ranked));
    }

    // Optional exports.
    let multiple = run.modes.len() > 1;
    if let Some(path) = &config.export_series {
        for m in &run.modes {
            let target = pipeline::export_path_for(path, m.result.mode, multiple);
            crate::io::export::write_series_csv(&target, calc.table(), &m.result)?;
        }
    }
    if let Some(path) = &config.export_json {
        let files: Vec<_> = run
            .modes
            .iter()
            .map(|m| crate::io::export::result_file(calc.table(), calc.basket(), calc.benchmark_date(), &m.result))
            .collect();
        crate::io::export::write_result_json(path, &files)?;
    }

    Ok(())
}

pub fn run_config_from_args(data: &DataArgs, search: &SearchOptions) -> RunConfig {
    RunConfig {
        csv_path: Some(data.csv.clone()),
        benchmark_date: Some(data.benchmark_date),
        basket: data.basket.clone(),
        step: data.step,
        ..run_config_from_search_options(search)
    }
}

fn run_config_from_search_options(search: &SearchOptions) -> RunConfig {
    RunConfig {
        modes: search.mode.modes(),
        failure_policy: if search.skip_failed {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        },
        top_n: search.top,
        export_series: search.export.clone(),
        export_json: search.export_json.clone(),
        ..RunConfig::default()
    }
}
