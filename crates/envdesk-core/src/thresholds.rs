//! Optimal-range evaluation for workspace metrics.
//!
//! # Example
//!
//! ```
//! use envdesk_core::thresholds::{RangeStatus, Thresholds, adjustment};
//! use envdesk_types::Metric;
//!
//! let thresholds = Thresholds::default();
//! let status = thresholds.evaluate(Metric::Temperature, 26.0);
//! assert_eq!(status, RangeStatus::Above);
//!
//! let (label, command) = adjustment(Metric::Temperature, status).unwrap();
//! assert_eq!(label, "Decrease temperature");
//! assert_eq!(command, "decrease_temperature");
//! ```

use serde::{Deserialize, Serialize};

use envdesk_types::{EnvironmentSnapshot, Metric, OptimalRange, Reading};

/// Where a value sits relative to its optimal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeStatus {
    /// Below the lower bound.
    Below,
    /// Within the range, bounds inclusive.
    Optimal,
    /// Above the upper bound.
    Above,
}

impl RangeStatus {
    /// Classify `value` against `range`.
    pub fn of(value: f64, range: &OptimalRange) -> Self {
        if range.is_below(value) {
            RangeStatus::Below
        } else if range.is_above(value) {
            RangeStatus::Above
        } else {
            RangeStatus::Optimal
        }
    }

    /// Short label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            RangeStatus::Below => "Low",
            RangeStatus::Optimal => "Optimal",
            RangeStatus::Above => "High",
        }
    }

    /// Whether the value is within range.
    pub fn is_optimal(&self) -> bool {
        matches!(self, RangeStatus::Optimal)
    }
}

/// Action label and hardware command that move `metric` back toward its range.
///
/// Returns `None` when the value is already optimal.
pub fn adjustment(metric: Metric, status: RangeStatus) -> Option<(&'static str, &'static str)> {
    let pair = match (metric, status) {
        (_, RangeStatus::Optimal) => return None,
        (Metric::Temperature, RangeStatus::Above) => ("Decrease temperature", "decrease_temperature"),
        (Metric::Temperature, RangeStatus::Below) => ("Increase temperature", "increase_temperature"),
        (Metric::Light, RangeStatus::Above) => ("Decrease lighting", "decrease_light"),
        (Metric::Light, RangeStatus::Below) => ("Increase lighting", "increase_light"),
        (Metric::Humidity, RangeStatus::Above) => ("Decrease humidity", "decrease_humidity"),
        (Metric::Humidity, RangeStatus::Below) => ("Increase humidity", "increase_humidity"),
        (Metric::Noise, RangeStatus::Above) => ("Reduce noise sources", "reduce_noise"),
        (Metric::Noise, RangeStatus::Below) => ("Add ambient sound", "add_ambient_sound"),
    };
    Some(pair)
}

/// Per-metric optimal ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    light: OptimalRange,
    temperature: OptimalRange,
    humidity: OptimalRange,
    noise: OptimalRange,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            light: Metric::Light.default_optimal(),
            temperature: Metric::Temperature.default_optimal(),
            humidity: Metric::Humidity.default_optimal(),
            noise: Metric::Noise.default_optimal(),
        }
    }
}

impl Thresholds {
    /// Thresholds with the default ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the range for `metric`.
    pub fn with_range(mut self, metric: Metric, range: OptimalRange) -> Self {
        *self.range_mut(metric) = range;
        self
    }

    /// The range for `metric`.
    pub fn range(&self, metric: Metric) -> OptimalRange {
        match metric {
            Metric::Light => self.light,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Noise => self.noise,
        }
    }

    fn range_mut(&mut self, metric: Metric) -> &mut OptimalRange {
        match metric {
            Metric::Light => &mut self.light,
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Noise => &mut self.noise,
        }
    }

    /// Classify a value of `metric`.
    pub fn evaluate(&self, metric: Metric, value: f64) -> RangeStatus {
        RangeStatus::of(value, &self.range(metric))
    }

    /// Classify a reading against its own optimal range.
    pub fn evaluate_reading(reading: &Reading) -> RangeStatus {
        RangeStatus::of(reading.value, &reading.optimal)
    }

    /// Write these ranges into every reading of `snapshot`.
    pub fn apply_to(&self, snapshot: &mut EnvironmentSnapshot) {
        for metric in Metric::ALL {
            snapshot.get_mut(metric).optimal = self.range(metric);
        }
    }

    /// Metrics of `snapshot` that are outside their range.
    pub fn out_of_range(snapshot: &EnvironmentSnapshot) -> Vec<(Metric, RangeStatus)> {
        snapshot
            .iter()
            .map(|r| (r.metric, Self::evaluate_reading(r)))
            .filter(|(_, status)| !status.is_optimal())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_environment;

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate(Metric::Light, 250.0), RangeStatus::Below);
        assert_eq!(t.evaluate(Metric::Light, 400.0), RangeStatus::Optimal);
        assert_eq!(t.evaluate(Metric::Light, 512.0), RangeStatus::Above);
        assert_eq!(t.evaluate(Metric::Temperature, 21.0), RangeStatus::Optimal);
        assert_eq!(t.evaluate(Metric::Temperature, 25.0), RangeStatus::Optimal);
        assert_eq!(t.evaluate(Metric::Noise, 60.5), RangeStatus::Above);
        assert_eq!(t.evaluate(Metric::Humidity, 39.9), RangeStatus::Below);
    }

    #[test]
    fn test_custom_range() {
        let t = Thresholds::new().with_range(Metric::Noise, OptimalRange::new(35.0, 55.0));
        assert_eq!(t.evaluate(Metric::Noise, 58.0), RangeStatus::Above);
        assert_eq!(t.range(Metric::Light), Metric::Light.default_optimal());
    }

    #[test]
    fn test_adjustment_commands() {
        assert_eq!(adjustment(Metric::Light, RangeStatus::Optimal), None);
        assert_eq!(
            adjustment(Metric::Temperature, RangeStatus::Above).map(|(_, c)| c),
            Some("decrease_temperature")
        );
        assert_eq!(
            adjustment(Metric::Humidity, RangeStatus::Below).map(|(_, c)| c),
            Some("increase_humidity")
        );
        assert_eq!(
            adjustment(Metric::Noise, RangeStatus::Below).map(|(_, c)| c),
            Some("add_ambient_sound")
        );
    }

    #[test]
    fn test_apply_to_snapshot() {
        let mut snapshot = mock_environment();
        let t = Thresholds::new().with_range(Metric::Light, OptimalRange::new(500.0, 800.0));
        t.apply_to(&mut snapshot);
        assert_eq!(snapshot.light.optimal, OptimalRange::new(500.0, 800.0));
        assert!(Thresholds::evaluate_reading(&snapshot.light).is_optimal());
    }

    #[test]
    fn test_out_of_range_on_mock_baseline() {
        let snapshot = mock_environment();
        let out = Thresholds::out_of_range(&snapshot);
        // Baseline light (512 lux) is above 300-500; the rest are in range.
        assert_eq!(out, vec![(Metric::Light, RangeStatus::Above)]);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RangeStatus::Below.label(), "Low");
        assert_eq!(RangeStatus::Above.label(), "High");
        assert!(RangeStatus::Optimal.is_optimal());
    }
}
