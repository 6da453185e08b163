//! Reusable widget helpers for the dashboard.

use envdesk_core::{History, Metric, Trend};

/// Bar heights are scaled into `1..=SPARKLINE_SCALE`.
const SPARKLINE_SCALE: f64 = 100.0;

/// Convert a history window into sparkline bar heights.
///
/// Values are rescaled to the window's own min/max so small swings, such as
/// a tenth of a degree, stay visible. A flat window renders at half height.
#[must_use]
pub fn sparkline_data(history: &History) -> Vec<u64> {
    let values = history.values();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span > f64::EPSILON {
                1 + ((v - min) / span * (SPARKLINE_SCALE - 1.0)).round() as u64
            } else {
                (SPARKLINE_SCALE / 2.0) as u64
            }
        })
        .collect()
}

/// Resample sparkline data to fit a target width.
///
/// Shorter data is stretched by repeating points; longer data is averaged
/// into buckets.
#[must_use]
pub fn resample_sparkline_data(data: &[u64], target_width: usize) -> Vec<u64> {
    if data.is_empty() || target_width == 0 {
        return Vec::new();
    }
    if data.len() == target_width {
        return data.to_vec();
    }

    if data.len() < target_width {
        return (0..target_width)
            .map(|i| data[(i * (data.len() - 1) / (target_width - 1).max(1)).min(data.len() - 1)])
            .collect();
    }

    let bucket_size = data.len() as f64 / target_width as f64;
    (0..target_width)
        .filter_map(|i| {
            let start = (i as f64 * bucket_size) as usize;
            let end = (((i + 1) as f64 * bucket_size) as usize).min(data.len());
            if start < end {
                let bucket = &data[start..end];
                Some(bucket.iter().sum::<u64>() / bucket.len() as u64)
            } else {
                data.get(start).copied()
            }
        })
        .collect()
}

/// Arrow for a history trend.
#[must_use]
pub fn trend_arrow(trend: Option<Trend>) -> &'static str {
    match trend {
        Some(Trend::Increasing) => "↑",
        Some(Trend::Decreasing) => "↓",
        Some(Trend::Stable) => "→",
        None => " ",
    }
}

/// Format a value with the metric's precision and unit.
#[must_use]
pub fn format_reading(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Temperature => format!("{value:.1}{}", metric.unit()),
        Metric::Humidity => format!("{value:.0}{}", metric.unit()),
        _ => format!("{value:.0} {}", metric.unit()),
    }
}
