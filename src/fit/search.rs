//! Exhaustive search for the basket weighting that best explains inflation.
//!
//! For each candidate weight triple:
//! - value the basket (CCBD series)
//! - compute the misalignment `EXC - CCBD`
//! - regress `INF` on `[1, misalignment]`
//!
//! and keep the candidate with the highest R².
//!
//! Candidates are evaluated in parallel, collected back in enumeration order,
//! then reduced sequentially with a strict `>`: the first of several tied
//! candidates wins and is never displaced. The result is identical to a
//! sequential scan.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{
    CandidateScore, EXC_COLUMN, FailurePolicy, INF_COLUMN, OptimalWeights, SkippedCandidate,
    ValuationMode, WeightVector,
};
use crate::error::AppError;
use crate::math::fit_with_intercept;
use crate::models::BasketValuator;

#[derive(Debug, Clone)]
struct Evaluated {
    idx: usize,
    weights: WeightVector,
    ccbd: Vec<f64>,
    misalignment: Vec<f64>,
    r_squared: f64,
    coefficients: Vec<f64>,
}

/// Run the grid search without touching the table.
///
/// Writing the winning misalignment column is left to the caller
/// (see [`crate::calculator::CcbCalculator::search`]) so the table is mutated
/// at most once, after the winner is final.
pub fn search_optimal(
    valuator: &BasketValuator<'_>,
    grid: &[WeightVector],
    mode: ValuationMode,
    policy: FailurePolicy,
) -> Result<OptimalWeights, AppError> {
    if grid.is_empty() {
        return Err(AppError::EmptyGrid);
    }

    let table = valuator.table();
    let exc = table.column(EXC_COLUMN)?;
    let inf = table.column(INF_COLUMN)?;

    // Evaluate each candidate independently (parallel); `collect` keeps grid order.
    let outcomes: Vec<Result<Evaluated, AppError>> = grid
        .par_iter()
        .enumerate()
        .map(|(idx, &weights)| evaluate_candidate(valuator, idx, weights, mode, exc, inf))
        .collect();

    let mut best: Option<Evaluated> = None;
    let mut evaluated = Vec::with_capacity(grid.len());
    let mut skipped = Vec::new();

    for (idx, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(candidate) => {
                debug!(
                    idx,
                    weights = %candidate.weights,
                    r_squared = candidate.r_squared,
                    mode = mode.display_name(),
                    "scored candidate"
                );
                evaluated.push(CandidateScore {
                    index: candidate.idx,
                    weights: candidate.weights,
                    r_squared: candidate.r_squared,
                });
                let improves = best
                    .as_ref()
                    .is_none_or(|b| candidate.r_squared > b.r_squared);
                if improves {
                    best = Some(candidate);
                }
            }
            Err(err) => match policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::Skip => {
                    warn!(idx, weights = %grid[idx], error = %err, "skipping candidate");
                    skipped.push(SkippedCandidate {
                        index: idx,
                        weights: grid[idx],
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    let Some(best) = best else {
        return Err(AppError::NoValidCandidates {
            skipped: skipped.len(),
        });
    };

    info!(
        mode = mode.display_name(),
        weights = %best.weights,
        r_squared = best.r_squared,
        evaluated = evaluated.len(),
        skipped = skipped.len(),
        "optimal weights found"
    );

    Ok(OptimalWeights {
        mode,
        weights: best.weights,
        ccbd: best.ccbd,
        misalignment: best.misalignment,
        r_squared: best.r_squared,
        coefficients: best.coefficients,
        evaluated,
        skipped,
    })
}

fn evaluate_candidate(
    valuator: &BasketValuator<'_>,
    idx: usize,
    weights: WeightVector,
    mode: ValuationMode,
    exc: &[f64],
    inf: &[f64],
) -> Result<Evaluated, AppError> {
    let ccbd = valuator.valuate(weights, mode)?;
    let misalignment: Vec<f64> = exc.iter().zip(ccbd.iter()).map(|(e, c)| e - c).collect();
    let fit = fit_with_intercept(&misalignment, inf)?;

    Ok(Evaluated {
        idx,
        weights,
        ccbd,
        misalignment,
        r_squared: fit.r_squared,
        coefficients: fit.coefficients,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::TimeSeriesTable;
    use crate::fit::weight_grid::{default_grid, weight_grid};
    use crate::models::basket::tests::{basket, d};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    /// Irregular but smooth factor paths; no two candidates produce affine-related misalignments.
    pub(crate) fn synthetic_table(n: usize) -> TimeSeriesTable {
        let dates: Vec<NaiveDate> = (0..n)
            .map(|i| d(2010 + (i / 12) as i32, (i % 12) as u32 + 1, 1))
            .collect();
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        TimeSeriesTable::new(dates)
            .unwrap()
            .with_column("USD", t.iter().map(|x| 1.0 + 0.02 * (0.7 * x).sin()).collect())
            .unwrap()
            .with_column("EUR", t.iter().map(|x| 0.9 + 0.05 * (0.3 * x + 0.4).cos()).collect())
            .unwrap()
            .with_column(
                "OIL",
                t.iter().map(|x| 50.0 + 8.0 * (0.45 * x + 1.1).sin() + 0.3 * x).collect(),
            )
            .unwrap()
            .with_column(
                "EXC",
                t.iter().map(|x| 1.2 + 0.04 * (1.3 * x).sin() + 0.002 * x).collect(),
            )
            .unwrap()
    }

    /// Add an `INF` column that is an exact affine function of the misalignment under `target`.
    pub(crate) fn with_inflation_from(
        mut table: TimeSeriesTable,
        target: WeightVector,
        mode: ValuationMode,
    ) -> TimeSeriesTable {
        let basket = basket();
        let bd = table.dates()[0];
        let ccbd = BasketValuator::new(&table, &basket, bd).valuate(target, mode).unwrap();
        let inf: Vec<f64> = table
            .column("EXC")
            .unwrap()
            .iter()
            .zip(ccbd.iter())
            .map(|(e, c)| 0.03 + 0.5 * (e - c))
            .collect();
        table.insert_column("INF", inf).unwrap();
        table
    }

    #[test]
    fn recovers_pure_oil_weighting() {
        let target = WeightVector::new(0.0, 0.0, 1.0);
        let table = with_inflation_from(synthetic_table(36), target, ValuationMode::Fixed);
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);

        let best = search_optimal(&v, &default_grid(), ValuationMode::Fixed, FailurePolicy::Abort).unwrap();
        assert_eq!(best.weights, target);
        assert_relative_eq!(best.r_squared, 1.0, epsilon = 1e-9);
        assert_relative_eq!(best.coefficients[0], 0.03, epsilon = 1e-8);
        assert_relative_eq!(best.coefficients[1], 0.5, epsilon = 1e-8);
        assert_eq!(best.evaluated.len(), 66);
        assert!(best.skipped.is_empty());
    }

    #[test]
    fn recovers_interior_weighting_in_both_modes() {
        let target = WeightVector::new(0.2, 0.3, 0.5);
        for mode in [ValuationMode::Fixed, ValuationMode::Variable] {
            let table = with_inflation_from(synthetic_table(48), target, mode);
            let basket = basket();
            let v = BasketValuator::new(&table, &basket, table.dates()[0]);
            let best = search_optimal(&v, &default_grid(), mode, FailurePolicy::Abort).unwrap();
            assert_eq!(best.weights, target, "mode {mode:?}");
            assert_eq!(best.mode, mode);
            let misalignment: Vec<f64> = table
                .column("EXC")
                .unwrap()
                .iter()
                .zip(best.ccbd.iter())
                .map(|(e, c)| e - c)
                .collect();
            assert_eq!(misalignment, best.misalignment);
        }
    }

    #[test]
    fn winner_dominates_every_evaluated_candidate() {
        let mut table = synthetic_table(30);
        let noisy: Vec<f64> = (0..30).map(|i| ((i * 7 % 11) as f64).sqrt() * 0.01).collect();
        table.insert_column("INF", noisy).unwrap();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[5]);

        let best = search_optimal(&v, &default_grid(), ValuationMode::Variable, FailurePolicy::Abort).unwrap();
        for c in &best.evaluated {
            assert!(best.r_squared >= c.r_squared, "{} beats the winner", c.weights);
        }
    }

    #[test]
    fn matches_a_sequential_strict_fold() {
        let mut table = synthetic_table(24);
        let inf: Vec<f64> = (0..24).map(|i| (i as f64 * 0.37).cos() * 0.02 + 0.01).collect();
        table.insert_column("INF", inf).unwrap();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        let grid = weight_grid(0.1).unwrap();

        let mut best_r2 = f64::NEG_INFINITY;
        let mut best_w = None;
        for &w in &grid {
            let ccbd = v.valuate(w, ValuationMode::Fixed).unwrap();
            let mis: Vec<f64> = table.column("EXC").unwrap().iter().zip(&ccbd).map(|(e, c)| e - c).collect();
            let r2 = fit_with_intercept(&mis, table.column("INF").unwrap()).unwrap().r_squared;
            if r2 > best_r2 {
                best_r2 = r2;
                best_w = Some(w);
            }
        }

        let best = search_optimal(&v, &grid, ValuationMode::Fixed, FailurePolicy::Abort).unwrap();
        assert_eq!(Some(best.weights), best_w);
        assert_eq!(best.r_squared, best_r2);
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        // With a USD-only basket, candidates sharing the USD weight produce
        // bit-identical series and therefore identical R².
        let mut table = synthetic_table(24);
        let basket = vec!["USD".to_string()];
        let bd = table.dates()[0];
        let ccbd = BasketValuator::new(&table, &basket, bd)
            .valuate(WeightVector::new(0.5, 0.5, 0.0), ValuationMode::Fixed)
            .unwrap();
        let inf: Vec<f64> = table
            .column("EXC")
            .unwrap()
            .iter()
            .zip(&ccbd)
            .map(|(e, c)| 0.01 + 0.5 * (e - c))
            .collect();
        table.insert_column("INF", inf).unwrap();

        let v = BasketValuator::new(&table, &basket, bd);
        let best = search_optimal(&v, &weight_grid(0.5).unwrap(), ValuationMode::Fixed, FailurePolicy::Abort)
            .unwrap();
        // (0.5, 0, 0.5) precedes (0.5, 0.5, 0) in enumeration order.
        assert_eq!(best.weights, WeightVector::new(0.5, 0.0, 0.5));
        assert_eq!(best.evaluated[3].r_squared, best.evaluated[4].r_squared);
    }

    fn usd_numeraire_table() -> TimeSeriesTable {
        // USD == 1 everywhere: in variable mode the pure-USD candidate values
        // the basket at exactly EXC, so its misalignment is identically zero.
        let mut table = synthetic_table(24);
        table.insert_column("USD", vec![1.0; 24]).unwrap();
        let inf: Vec<f64> = (0..24).map(|i| (i as f64 * 0.5).sin() * 0.03).collect();
        table.insert_column("INF", inf).unwrap();
        table
    }

    #[test]
    fn abort_policy_propagates_first_failure() {
        let table = usd_numeraire_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        let err = search_optimal(&v, &default_grid(), ValuationMode::Variable, FailurePolicy::Abort)
            .unwrap_err();
        assert!(matches!(err, AppError::DegenerateRegression(_)));
    }

    #[test]
    fn skip_policy_records_failed_candidates() {
        let table = usd_numeraire_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        let best = search_optimal(&v, &default_grid(), ValuationMode::Variable, FailurePolicy::Skip)
            .unwrap();
        assert_eq!(best.skipped.len(), 1);
        assert_eq!(best.skipped[0].weights, WeightVector::new(1.0, 0.0, 0.0));
        assert_eq!(best.skipped[0].index, 65);
        assert_eq!(best.evaluated.len(), 65);
        assert_ne!(best.weights, WeightVector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn skip_policy_with_no_survivors_fails() {
        let table = usd_numeraire_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        let grid = [WeightVector::new(1.0, 0.0, 0.0)];
        let err = search_optimal(&v, &grid, ValuationMode::Variable, FailurePolicy::Skip).unwrap_err();
        assert!(matches!(err, AppError::NoValidCandidates { skipped: 1 }));
    }

    fn zero_oil_rate_table() -> TimeSeriesTable {
        let mut table = synthetic_table(24);
        let mut oil = table.column("OIL").unwrap().to_vec();
        oil[7] = 0.0;
        table.insert_column("OIL", oil).unwrap();
        let inf: Vec<f64> = (0..24).map(|i| (i as f64 * 0.5).sin() * 0.03).collect();
        table.insert_column("INF", inf).unwrap();
        table
    }

    #[test]
    fn non_finite_valuation_aborts_the_search() {
        let table = zero_oil_rate_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        let err = search_optimal(&v, &default_grid(), ValuationMode::Variable, FailurePolicy::Abort)
            .unwrap_err();
        match err {
            AppError::NonFiniteValuation { weights, date } => {
                // First candidate in enumeration order.
                assert_eq!(weights, WeightVector::new(0.0, 0.0, 1.0));
                assert_eq!(date, table.dates()[7]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_finite_valuation_is_recorded_under_skip() {
        let table = zero_oil_rate_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);

        // A zero OIL weight over a zero OIL rate is 0/0, so every candidate fails.
        let err = search_optimal(&v, &default_grid(), ValuationMode::Variable, FailurePolicy::Skip)
            .unwrap_err();
        assert!(matches!(err, AppError::NoValidCandidates { skipped: 66 }));

        // Dropping OIL from the basket takes the zero rate out of the sum.
        let no_oil = vec!["USD".to_string(), "EUR".to_string()];
        let v = BasketValuator::new(&table, &no_oil, table.dates()[0]);
        let best = search_optimal(&v, &default_grid(), ValuationMode::Variable, FailurePolicy::Skip)
            .unwrap();
        assert!(best.r_squared.is_finite());
        for s in &best.skipped {
            assert!(!s.reason.contains("Non-finite"), "{}", s.reason);
        }
    }

    #[test]
    fn zero_rate_off_the_benchmark_date_only_fails_variable_mode() {
        let table = zero_oil_rate_table();
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        // Fixed mode divides by the benchmark row only.
        let grid = [
            WeightVector::new(0.0, 0.0, 1.0),
            WeightVector::new(0.5, 0.5, 0.0),
        ];
        let fixed = search_optimal(&v, &grid, ValuationMode::Fixed, FailurePolicy::Skip).unwrap();
        assert!(fixed.skipped.is_empty());
        assert_eq!(fixed.evaluated.len(), 2);

        let err = search_optimal(&v, &grid, ValuationMode::Variable, FailurePolicy::Skip).unwrap_err();
        assert!(matches!(err, AppError::NoValidCandidates { skipped: 2 }));
    }

    #[test]
    fn empty_grid_and_missing_inflation_are_errors() {
        let table = synthetic_table(12);
        let basket = basket();
        let v = BasketValuator::new(&table, &basket, table.dates()[0]);
        assert!(matches!(
            search_optimal(&v, &[], ValuationMode::Fixed, FailurePolicy::Abort),
            Err(AppError::EmptyGrid)
        ));
        assert!(matches!(
            search_optimal(&v, &default_grid(), ValuationMode::Fixed, FailurePolicy::Abort),
            Err(AppError::MissingKey { .. })
        ));
    }
}
