//! Short-term trend detection over recent samples.

use envdesk_types::{History, Trend};

/// Number of trailing samples considered.
pub const TREND_WINDOW: usize = 3;

/// Relative change below which a metric counts as stable.
pub const STABLE_FRACTION: f64 = 0.05;

/// Classify the direction of the last [`TREND_WINDOW`] values.
///
/// Returns `None` with fewer than three samples. The series is `stable` when
/// `|last - first| < first * 0.05`, so a non-positive first value never
/// counts as stable.
///
/// ```
/// use envdesk_core::trend::analyze_trend;
/// use envdesk_types::Trend;
///
/// assert_eq!(analyze_trend(&[100.0, 101.0, 102.0]), Some(Trend::Stable));
/// assert_eq!(analyze_trend(&[100.0, 110.0, 120.0]), Some(Trend::Increasing));
/// assert_eq!(analyze_trend(&[1.0, 2.0]), None);
/// ```
pub fn analyze_trend(values: &[f64]) -> Option<Trend> {
    if values.len() < TREND_WINDOW {
        return None;
    }

    let recent = &values[values.len() - TREND_WINDOW..];
    let first = recent[0];
    let last = recent[TREND_WINDOW - 1];
    let difference = last - first;

    if difference.abs() < first * STABLE_FRACTION {
        Some(Trend::Stable)
    } else if difference > 0.0 {
        Some(Trend::Increasing)
    } else {
        Some(Trend::Decreasing)
    }
}

/// [`analyze_trend`] over a history window.
pub fn history_trend(history: &History) -> Option<Trend> {
    analyze_trend(&history.last_values(TREND_WINDOW))
}
