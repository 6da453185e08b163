//! Mock environment data and a mock telemetry source.
//!
//! [`mock_environment`] produces the baseline readings the dashboard falls back
//! to when live telemetry is missing. [`simulate_update`] applies one bounded
//! random-walk step, which drives `--offline` mode.
//!
//! [`MockTelemetry`] implements [`TelemetrySource`] for tests and offline use.
//!
//! # Features
//!
//! - **Failure injection**: fail every request, the next N requests, or only
//!   requests for specific metrics
//! - **Latency simulation**: add artificial delays to simulate a slow channel
//! - **Drift**: optionally random-walk each metric on every `latest` call

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use envdesk_types::{
    DEFAULT_HISTORY_LEN, DataPoint, EnvironmentSnapshot, History, Metric, Reading,
};

use crate::error::{Error, Result};
use crate::telemetry::TelemetrySource;

/// Spacing between synthetic history points.
pub const MOCK_SAMPLE_SPACING: time::Duration = time::Duration::minutes(5);

/// Baseline value, history center and history spread for a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockProfile {
    /// Current value shown before any live data arrives.
    pub value: f64,
    /// Center of the synthetic history.
    pub base: f64,
    /// Maximum deviation of synthetic history points from `base`.
    pub variance: f64,
}

impl MockProfile {
    /// Profile for `metric`.
    pub const fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Light => Self {
                value: 512.0,
                base: 400.0,
                variance: 150.0,
            },
            Metric::Temperature => Self {
                value: 24.7,
                base: 23.0,
                variance: 2.0,
            },
            Metric::Humidity => Self {
                value: 42.0,
                base: 45.0,
                variance: 10.0,
            },
            Metric::Noise => Self {
                value: 58.0,
                base: 50.0,
                variance: 15.0,
            },
        }
    }
}

/// Per-step drift and clamp bounds used by [`simulate_update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftBounds {
    /// Maximum change per step.
    pub step: f64,
    /// Lower clamp.
    pub min: f64,
    /// Upper clamp.
    pub max: f64,
}

impl DriftBounds {
    /// Bounds for `metric`.
    pub const fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Light => Self {
                step: 20.0,
                min: 0.0,
                max: f64::INFINITY,
            },
            Metric::Temperature => Self {
                step: 0.3,
                min: 15.0,
                max: 30.0,
            },
            Metric::Humidity => Self {
                step: 2.0,
                min: 20.0,
                max: 80.0,
            },
            Metric::Noise => Self {
                step: 4.0,
                min: 30.0,
                max: 80.0,
            },
        }
    }
}

/// Generate `count` points around `base`, spaced five minutes apart and ending
/// five minutes before `now`.
pub fn generate_history<R: Rng + ?Sized>(
    rng: &mut R,
    base: f64,
    variance: f64,
    count: usize,
    now: OffsetDateTime,
) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            let steps_back = i32::try_from(count - i).unwrap_or(i32::MAX);
            let timestamp = now - MOCK_SAMPLE_SPACING * steps_back;
            let value = base + rng.random_range(-variance..=variance);
            DataPoint::new(value, timestamp)
        })
        .collect()
}

/// Build a mock reading for `metric` with a full synthetic history.
pub fn mock_reading<R: Rng + ?Sized>(rng: &mut R, metric: Metric, now: OffsetDateTime) -> Reading {
    let profile = MockProfile::for_metric(metric);
    let history = History::from_points(
        DEFAULT_HISTORY_LEN,
        generate_history(rng, profile.base, profile.variance, DEFAULT_HISTORY_LEN, now),
    );
    Reading::new(metric, profile.value).with_history(history)
}

/// Build a mock snapshot at `now` using `rng`.
pub fn mock_environment_with<R: Rng + ?Sized>(rng: &mut R, now: OffsetDateTime) -> EnvironmentSnapshot {
    EnvironmentSnapshot {
        light: mock_reading(rng, Metric::Light, now),
        temperature: mock_reading(rng, Metric::Temperature, now),
        humidity: mock_reading(rng, Metric::Humidity, now),
        noise: mock_reading(rng, Metric::Noise, now),
        timestamp: now,
    }
}

/// Build a mock snapshot stamped with the current time.
///
/// ```
/// use envdesk_core::mock::mock_environment;
///
/// let snapshot = mock_environment();
/// assert_eq!(snapshot.light.value, 512.0);
/// assert_eq!(snapshot.light.history.len(), 24);
/// ```
pub fn mock_environment() -> EnvironmentSnapshot {
    mock_environment_with(&mut rand::rng(), OffsetDateTime::now_utc())
}

/// Random-walk one reading and append the new value to its history.
pub fn drift_reading<R: Rng + ?Sized>(reading: &mut Reading, rng: &mut R, now: OffsetDateTime) {
    let bounds = DriftBounds::for_metric(reading.metric);
    let next = reading.value + rng.random_range(-bounds.step..=bounds.step);
    reading.value = next.clamp(bounds.min, bounds.max);
    reading.history.push(DataPoint::new(reading.value, now));
}

/// Apply one drift step to every reading and restamp the snapshot.
pub fn simulate_update<R: Rng + ?Sized>(
    snapshot: &mut EnvironmentSnapshot,
    rng: &mut R,
    now: OffsetDateTime,
) {
    for metric in Metric::ALL {
        drift_reading(snapshot.get_mut(metric), rng, now);
    }
    snapshot.timestamp = now;
}

/// A mock telemetry source for testing and offline mode.
///
/// # Example
///
/// ```
/// use envdesk_core::mock::MockTelemetry;
/// use envdesk_core::telemetry::TelemetrySource;
/// use envdesk_types::Metric;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockTelemetry::new();
///     source.set_value(Metric::Light, 420.0).await;
///     assert_eq!(source.latest(Metric::Light).await.unwrap(), 420.0);
/// }
/// ```
pub struct MockTelemetry {
    values: RwLock<HashMap<Metric, f64>>,
    history: RwLock<HashMap<Metric, Vec<DataPoint>>>,
    failing_metrics: RwLock<HashSet<Metric>>,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Number of upcoming requests that fail before requests succeed again.
    remaining_failures: AtomicU32,
    request_count: AtomicU32,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    drift: AtomicBool,
}

impl std::fmt::Debug for MockTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTelemetry")
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("request_count", &self.request_count.load(Ordering::Relaxed))
            .field("drift", &self.drift.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTelemetry {
    /// Create a source seeded from a fresh [`mock_environment`].
    pub fn new() -> Self {
        Self::from_snapshot(&mock_environment())
    }

    /// Create a source seeded from `snapshot`.
    pub fn from_snapshot(snapshot: &EnvironmentSnapshot) -> Self {
        let values = snapshot.iter().map(|r| (r.metric, r.value)).collect();
        let history = snapshot
            .iter()
            .map(|r| (r.metric, r.history.iter().copied().collect()))
            .collect();

        Self {
            values: RwLock::new(values),
            history: RwLock::new(history),
            failing_metrics: RwLock::new(HashSet::new()),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            remaining_failures: AtomicU32::new(0),
            request_count: AtomicU32::new(0),
            latency_ms: AtomicU64::new(0),
            drift: AtomicBool::new(false),
        }
    }

    /// Enable random-walk drift on every `latest` call.
    pub fn with_drift(self, drift: bool) -> Self {
        self.drift.store(drift, Ordering::Relaxed);
        self
    }

    /// Set the latest value of `metric`.
    pub async fn set_value(&self, metric: Metric, value: f64) {
        self.values.write().await.insert(metric, value);
    }

    /// Replace the history of `metric`.
    pub async fn set_history(&self, metric: Metric, points: Vec<DataPoint>) {
        self.history.write().await.insert(metric, points);
    }

    /// Make every request fail (or succeed again).
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail the next `count` requests, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Make requests for `metric` fail while leaving other metrics untouched.
    pub async fn set_metric_failing(&self, metric: Metric, failing: bool) {
        let mut failing_metrics = self.failing_metrics.write().await;
        if failing {
            failing_metrics.insert(metric);
        } else {
            failing_metrics.remove(&metric);
        }
    }

    /// Set simulated request latency.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of requests served (successful or not).
    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::Relaxed)
    }

    async fn check_should_fail(&self, metric: Metric) -> Result<()> {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::api(503, self.fail_message.read().await.clone()));
        }

        if self.should_fail.load(Ordering::Relaxed)
            || self.failing_metrics.read().await.contains(&metric)
        {
            return Err(Error::api(503, self.fail_message.read().await.clone()));
        }

        Ok(())
    }
}

#[async_trait]
impl TelemetrySource for MockTelemetry {
    async fn history(&self, metric: Metric, count: usize) -> Result<Vec<DataPoint>> {
        self.check_should_fail(metric).await?;
        let history = self.history.read().await;
        let points = history.get(&metric).map(Vec::as_slice).unwrap_or_default();
        let skip = points.len().saturating_sub(count);
        Ok(points[skip..].to_vec())
    }

    async fn latest(&self, metric: Metric) -> Result<f64> {
        self.check_should_fail(metric).await?;
        let mut values = self.values.write().await;
        let current = values
            .get(&metric)
            .copied()
            .unwrap_or(MockProfile::for_metric(metric).value);

        if !self.drift.load(Ordering::Relaxed) {
            return Ok(current);
        }

        let now = OffsetDateTime::now_utc();
        let mut reading = Reading::new(metric, current);
        {
            let mut rng = rand::rng();
            drift_reading(&mut reading, &mut rng, now);
        }
        values.insert(metric, reading.value);
        drop(values);

        let mut history = self.history.write().await;
        let points = history.entry(metric).or_default();
        points.push(DataPoint::new(reading.value, now));
        let excess = points.len().saturating_sub(DEFAULT_HISTORY_LEN);
        points.drain(..excess);

        Ok(reading.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_mock_environment_baseline() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let snapshot = mock_environment_with(&mut rng(), now);

        assert_eq!(snapshot.light.value, 512.0);
        assert_eq!(snapshot.temperature.value, 24.7);
        assert_eq!(snapshot.humidity.value, 42.0);
        assert_eq!(snapshot.noise.value, 58.0);
        assert_eq!(snapshot.timestamp, now);

        for reading in snapshot.iter() {
            assert_eq!(reading.history.len(), DEFAULT_HISTORY_LEN);
            assert_eq!(reading.unit, reading.metric.unit());
        }
    }

    #[test]
    fn test_generate_history_spacing_and_spread() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let points = generate_history(&mut rng(), 400.0, 150.0, 24, now);

        assert_eq!(points.len(), 24);
        assert_eq!(points[0].timestamp, now - time::Duration::minutes(120));
        assert_eq!(points[23].timestamp, now - time::Duration::minutes(5));
        for pair in points.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, MOCK_SAMPLE_SPACING);
        }
        assert!(points.iter().all(|p| (250.0..=550.0).contains(&p.value)));
    }

    #[test]
    fn test_simulate_update_stays_in_bounds() {
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let mut rng = rng();
        let mut snapshot = mock_environment_with(&mut rng, now);

        for step in 1..=500 {
            let at = now + time::Duration::seconds(step);
            simulate_update(&mut snapshot, &mut rng, at);
            assert_eq!(snapshot.timestamp, at);
        }

        assert!(snapshot.light.value >= 0.0);
        assert!((15.0..=30.0).contains(&snapshot.temperature.value));
        assert!((20.0..=80.0).contains(&snapshot.humidity.value));
        assert!((30.0..=80.0).contains(&snapshot.noise.value));
        for reading in snapshot.iter() {
            assert_eq!(reading.history.len(), DEFAULT_HISTORY_LEN);
            assert_eq!(reading.history.latest().unwrap().value, reading.value);
        }
    }

    #[test]
    fn test_drift_step_is_bounded() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut reading = Reading::new(Metric::Temperature, 22.0);
        drift_reading(&mut reading, &mut rng(), now);
        assert!((reading.value - 22.0).abs() <= 0.3 + f64::EPSILON);
        assert_eq!(reading.history.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_telemetry_values() {
        let source = MockTelemetry::new();
        assert_eq!(source.latest(Metric::Noise).await.unwrap(), 58.0);

        source.set_value(Metric::Noise, 61.5).await;
        assert_eq!(source.latest(Metric::Noise).await.unwrap(), 61.5);
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_telemetry_history_count() {
        let source = MockTelemetry::new();
        let history = source.history(Metric::Light, 10).await.unwrap();
        assert_eq!(history.len(), 10);

        let all = source.history(Metric::Light, 100).await.unwrap();
        assert_eq!(all.len(), DEFAULT_HISTORY_LEN);
        assert_eq!(all[DEFAULT_HISTORY_LEN - 1], history[9]);
    }

    #[tokio::test]
    async fn test_mock_telemetry_fail() {
        let source = MockTelemetry::new();
        source.set_should_fail(true, Some("channel offline")).await;

        let err = source.latest(Metric::Light).await.unwrap_err();
        assert!(err.to_string().contains("channel offline"));

        source.set_should_fail(false, None).await;
        assert!(source.latest(Metric::Light).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_telemetry_transient_failures() {
        let source = MockTelemetry::new();
        source.set_transient_failures(2);

        assert!(source.latest(Metric::Light).await.is_err());
        assert!(source.latest(Metric::Light).await.is_err());
        assert!(source.latest(Metric::Light).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_telemetry_metric_failure_is_isolated() {
        let source = MockTelemetry::new();
        source.set_metric_failing(Metric::Humidity, true).await;

        assert!(source.latest(Metric::Humidity).await.is_err());
        assert!(source.latest(Metric::Light).await.is_ok());
        assert!(source.history(Metric::Humidity, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_telemetry_drift_appends_history() {
        let source = MockTelemetry::new().with_drift(true);
        let first = source.latest(Metric::Temperature).await.unwrap();
        assert!((first - 24.7).abs() <= 0.3 + f64::EPSILON);

        let history = source.history(Metric::Temperature, 100).await.unwrap();
        assert_eq!(history.len(), DEFAULT_HISTORY_LEN);
        assert_eq!(history.last().unwrap().value, first);
    }
}
