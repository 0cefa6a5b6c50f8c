//! Terminal formatting for search runs, special cases and grids.

use crate::domain::{CandidateScore, OptimalWeights, SpecialCases, ValuationMode, WeightVector};
use crate::data::TimeSeriesTable;

/// Header block describing the input table and run settings.
pub fn format_run_header(table: &TimeSeriesTable, basket: &[String], benchmark: chrono::NaiveDate) -> String {
    let mut out = String::new();
    out.push_str("=== ccb - Composite Benchmark Weight Search ===\n");
    out.push_str(&format!("Benchmark date: {benchmark}\n"));
    out.push_str(&format!("Basket: {}\n", basket.join(", ")));
    match (table.dates().first(), table.dates().last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Table: n={} | dates=[{first}, {last}] | columns={}\n",
            table.len(),
            table.column_names().join(",")
        )),
        _ => out.push_str("Table: empty\n"),
    }
    out
}

/// Summary of one search: winner, fit, skipped candidates.
pub fn format_search_summary(result: &OptimalWeights) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nMode: {}\n", result.mode.display_name()));
    out.push_str(&format!("- best weights: {}\n", result.weights));
    out.push_str(&format!("- R²          : {:.6}\n", result.r_squared));
    if let [intercept, slope, ..] = result.coefficients.as_slice() {
        out.push_str(&format!("- INF ~ {intercept:.6} + {slope:.6} * misalignment\n"));
    }
    out.push_str(&format!(
        "- candidates  : {} evaluated, {} skipped\n",
        result.evaluated.len(),
        result.skipped.len()
    ));
    out.push_str(&format!(
        "- column      : {}\n",
        result.mode.misalignment_column()
    ));
    for s in &result.skipped {
        out.push_str(&format!("  (skipped #{} {}) {}\n", s.index, s.weights, s.reason));
    }
    out
}

/// Ranked candidate table.
pub fn format_candidates(ranked: &[CandidateScore]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<5} {:>6} {:>6} {:>6} {:>10}\n",
        "#", "USD", "EUR", "OIL", "R²"
    ));
    for c in ranked {
        out.push_str(&format!(
            "{:<5} {:>6.2} {:>6.2} {:>6.2} {:>10.6}\n",
            c.index, c.weights.usd, c.weights.eur, c.weights.oil, c.r_squared
        ));
    }
    out
}

/// First/last value of each special-case series.
pub fn format_special_cases(cases: &SpecialCases, mode: ValuationMode) -> String {
    let mut out = String::new();
    out.push_str(&format!("Special cases ({}):\n", mode.display_name()));
    for (label, series) in [("OIL", &cases.oil), ("EUR", &cases.eur), ("USD", &cases.usd)] {
        match series.as_deref() {
            Some([first, .., last]) => out.push_str(&format!(
                "- pure {label}: n={} first={first:.6} last={last:.6}\n",
                series.as_ref().map_or(0, Vec::len)
            )),
            Some([only]) => out.push_str(&format!("- pure {label}: n=1 value={only:.6}\n")),
            Some([]) => out.push_str(&format!("- pure {label}: empty series\n")),
            None => out.push_str(&format!("- pure {label}: not in grid\n")),
        }
    }
    out
}

/// Weight grid, one triple per line.
pub fn format_grid(grid: &[WeightVector]) -> String {
    let mut out = format!("{} candidates\n", grid.len());
    for (i, w) in grid.iter().enumerate() {
        out.push_str(&format!("{i:>4} {:.4} {:.4} {:.4}\n", w.usd, w.eur, w.oil));
    }
    out
}
