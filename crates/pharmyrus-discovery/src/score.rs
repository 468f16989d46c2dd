//! Confidence scoring against the known baseline.

use pharmyrus_core::{ComparisonReport, ConfidenceStatus};

/// Score a BR count against the baseline. `baseline_count` must be
/// positive; the pipeline configuration enforces this before any run.
///
/// Bands: found >= baseline is Excellent, >= half the baseline is Good,
/// anything above zero is Partial, zero is Failed. The displayed rate is
/// capped at 100%.
pub fn score(baseline_name: &str, found_count: usize, baseline_count: usize) -> ComparisonReport {
    let rate = (found_count as f64 / baseline_count as f64 * 100.0)
        .round()
        .min(100.0) as u32;

    let status = if found_count >= baseline_count {
        ConfidenceStatus::Excellent
    } else if found_count * 2 >= baseline_count {
        ConfidenceStatus::Good
    } else if found_count > 0 {
        ConfidenceStatus::Partial
    } else {
        ConfidenceStatus::Failed
    };

    ComparisonReport {
        baseline: baseline_name.to_string(),
        expected_brs: baseline_count,
        br_found: found_count,
        br_rate: format!("{rate}%"),
        status,
    }
}
