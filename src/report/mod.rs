//! Reporting utilities: candidate rankings and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the valuation/search code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;

use crate::domain::CandidateScore;

/// Top-N candidates by R² (descending); ties keep enumeration order.
pub fn rank_candidates(scores: &[CandidateScore], top_n: usize) -> Vec<CandidateScore> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| {
        b.r_squared
            .partial_cmp(&a.r_squared)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    sorted.truncate(top_n);
    sorted
}
