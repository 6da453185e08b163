//! Merging live telemetry with fallback data.
//!
//! The merge is per metric and per field: a metric without a live value shows
//! the fallback value, and a metric with an empty live history shows the
//! fallback history. One stale metric never forces the others back to mock
//! data.

use time::OffsetDateTime;

use envdesk_types::{EnvironmentSnapshot, Metric, Reading};

use crate::poller::TelemetryState;

/// Where a displayed field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Live telemetry.
    Live,
    /// Fallback (mock or secondary feed) data.
    Fallback,
}

impl DataSource {
    /// Short badge text.
    pub fn badge(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Fallback => "mock",
        }
    }
}

/// Provenance of one merged reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    /// Source of the value.
    pub value: DataSource,
    /// Source of the history.
    pub history: DataSource,
}

/// Merge one metric.
pub fn merge_reading(live: &TelemetryState, fallback: &Reading) -> (Reading, Provenance) {
    let state = live.get(fallback.metric);
    let mut reading = fallback.clone();

    let value = match state.latest {
        Some(v) => {
            reading.value = v;
            DataSource::Live
        }
        None => DataSource::Fallback,
    };

    let history = if state.history.is_empty() {
        DataSource::Fallback
    } else {
        reading.history = state.history.clone();
        DataSource::Live
    };

    (reading, Provenance { value, history })
}

/// Merge live telemetry over `fallback`, stamping the result with `now`.
///
/// Units and optimal ranges always come from `fallback`.
pub fn merge(
    live: &TelemetryState,
    fallback: &EnvironmentSnapshot,
    now: OffsetDateTime,
) -> EnvironmentSnapshot {
    MergedView::build(live, fallback, now).snapshot
}

/// A merged snapshot together with per-metric provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedView {
    /// The merged readings.
    pub snapshot: EnvironmentSnapshot,
    provenance: [Provenance; 4],
}

impl MergedView {
    /// Merge `live` over `fallback`.
    pub fn build(live: &TelemetryState, fallback: &EnvironmentSnapshot, now: OffsetDateTime) -> Self {
        let (light, p_light) = merge_reading(live, &fallback.light);
        let (temperature, p_temperature) = merge_reading(live, &fallback.temperature);
        let (humidity, p_humidity) = merge_reading(live, &fallback.humidity);
        let (noise, p_noise) = merge_reading(live, &fallback.noise);

        Self {
            snapshot: EnvironmentSnapshot {
                light,
                temperature,
                humidity,
                noise,
                timestamp: now,
            },
            provenance: [p_light, p_temperature, p_humidity, p_noise],
        }
    }

    /// Provenance of `metric`.
    pub fn provenance(&self, metric: Metric) -> Provenance {
        let index = Metric::ALL
            .iter()
            .position(|m| *m == metric)
            .unwrap_or_default();
        self.provenance[index]
    }

    /// Whether any value in the view is live.
    pub fn has_live_values(&self) -> bool {
        self.provenance.iter().any(|p| p.value == DataSource::Live)
    }
}
