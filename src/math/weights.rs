//! Key-aligned arithmetic over code → value maps.
//!
//! Every binary operation is defined over the *intersection* of keys: a code
//! present in only one operand is dropped from the output, not reported.
//! Valuation leans on this to restrict the `(USD, EUR, OIL)` weights to the
//! codes that are actually in the basket.

use std::collections::BTreeMap;

/// Code → value map (relative weights, coefficients, a row of rates).
pub type WeightMap = BTreeMap<String, f64>;

/// `a[k] / b[k]` for every `k` in both maps.
///
/// Division by zero is not guarded here; it yields `inf`/`NaN` and is caught
/// by the valuator's finiteness check.
pub fn divide_maps(a: &WeightMap, b: &WeightMap) -> WeightMap {
    a.iter()
        .filter_map(|(k, &x)| b.get(k).map(|&y| (k.clone(), x / y)))
        .collect()
}

/// `a[k] * b[k]` for every `k` in both maps.
pub fn multiply_maps(a: &WeightMap, b: &WeightMap) -> WeightMap {
    a.iter()
        .filter_map(|(k, &x)| b.get(k).map(|&y| (k.clone(), x * y)))
        .collect()
}

/// Every value multiplied by `scalar`.
pub fn scale_map(a: &WeightMap, scalar: f64) -> WeightMap {
    a.iter().map(|(k, &x)| (k.clone(), x * scalar)).collect()
}

/// Sum of all values.
pub fn sum_values(a: &WeightMap) -> f64 {
    a.values().sum()
}
