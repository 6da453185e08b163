//! Periodic telemetry polling.
//!
//! [`TelemetryPoller`] owns a [`TelemetryState`]: for every metric the most
//! recent live value (if any has arrived) and a bounded history window.
//!
//! - [`TelemetryPoller::initialize`] loads a full history and the latest
//!   value for each metric.
//! - [`TelemetryPoller::poll`] fetches only the latest values. A successful
//!   fetch replaces `latest` and appends one point to history; a failed fetch
//!   leaves that metric exactly as it was.
//!
//! Failures are logged and absorbed. There is no retry or backoff; the next
//! interval simply tries again.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use envdesk_types::{DEFAULT_HISTORY_LEN, DataPoint, History, Metric};

use crate::telemetry::TelemetrySource;

/// Default telemetry poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Live state of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricState {
    /// Most recent live value; `None` until one has been fetched.
    pub latest: Option<f64>,
    /// Recent live samples.
    pub history: History,
}

impl MetricState {
    fn new(history_len: usize) -> Self {
        Self {
            latest: None,
            history: History::new(history_len),
        }
    }
}

/// Live state of all metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryState {
    light: MetricState,
    temperature: MetricState,
    humidity: MetricState,
    noise: MetricState,
    /// When the last successful fetch completed.
    pub last_update: Option<OffsetDateTime>,
    /// Message of the most recent failure, cleared on the next full success.
    pub last_error: Option<String>,
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl TelemetryState {
    /// Empty state with history windows of `history_len` points.
    pub fn new(history_len: usize) -> Self {
        Self {
            light: MetricState::new(history_len),
            temperature: MetricState::new(history_len),
            humidity: MetricState::new(history_len),
            noise: MetricState::new(history_len),
            last_update: None,
            last_error: None,
        }
    }

    /// State of `metric`.
    pub fn get(&self, metric: Metric) -> &MetricState {
        match metric {
            Metric::Light => &self.light,
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Noise => &self.noise,
        }
    }

    fn get_mut(&mut self, metric: Metric) -> &mut MetricState {
        match metric {
            Metric::Light => &mut self.light,
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Noise => &mut self.noise,
        }
    }

    /// Latest live value of `metric`.
    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.get(metric).latest
    }

    /// Apply one poll result for `metric`.
    ///
    /// `None` leaves the metric untouched. `Some(value)` replaces `latest` and
    /// appends a point stamped `at`, evicting the oldest when the window is full.
    /// Returns whether anything changed.
    pub fn apply(&mut self, metric: Metric, value: Option<f64>, at: OffsetDateTime) -> bool {
        let Some(value) = value else {
            return false;
        };
        let state = self.get_mut(metric);
        state.latest = Some(value);
        state.history.push(DataPoint::new(value, at));
        self.last_update = Some(at);
        true
    }

    /// Replace the history of `metric`, keeping its window capacity.
    pub fn set_history(&mut self, metric: Metric, points: Vec<DataPoint>) {
        self.get_mut(metric).history.replace(points);
    }

    /// Set `latest` without touching history.
    pub fn set_latest(&mut self, metric: Metric, value: Option<f64>) {
        self.get_mut(metric).latest = value;
    }

    /// Whether any metric has a live value.
    pub fn has_live_data(&self) -> bool {
        Metric::ALL.iter().any(|m| self.get(*m).latest.is_some())
    }
}

/// Result of one polling round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Metrics whose value was refreshed.
    pub updated: Vec<Metric>,
    /// Metrics whose fetch failed.
    pub failed: Vec<Metric>,
}

impl PollOutcome {
    /// Whether every metric failed.
    pub fn all_failed(&self) -> bool {
        self.updated.is_empty() && !self.failed.is_empty()
    }
}

/// Polls a [`TelemetrySource`] and maintains a [`TelemetryState`].
pub struct TelemetryPoller<S: TelemetrySource + ?Sized> {
    source: Arc<S>,
    history_count: usize,
    state: TelemetryState,
}

impl<S: TelemetrySource + ?Sized> std::fmt::Debug for TelemetryPoller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryPoller")
            .field("history_count", &self.history_count)
            .field("state", &self.state)
            .finish()
    }
}

impl<S: TelemetrySource + ?Sized + 'static> TelemetryPoller<S> {
    /// Create a poller whose history windows hold `history_count` points.
    pub fn new(source: Arc<S>, history_count: usize) -> Self {
        Self {
            source,
            history_count,
            state: TelemetryState::new(history_count),
        }
    }

    /// Current state.
    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    /// Load history and latest value for every metric.
    ///
    /// A failed history fetch leaves that window empty; a failed latest fetch
    /// leaves `latest` as `None`.
    pub async fn initialize(&mut self) -> &TelemetryState {
        for metric in Metric::ALL {
            match self.source.history(metric, self.history_count).await {
                Ok(points) => {
                    debug!(metric = %metric, points = points.len(), "Loaded history");
                    self.state.set_history(metric, points);
                }
                Err(e) => {
                    warn!(metric = %metric, error = %e, "Failed to load history");
                    self.state.last_error = Some(e.to_string());
                }
            }

            match self.source.latest(metric).await {
                Ok(value) => {
                    self.state.set_latest(metric, Some(value));
                    self.state.last_update = Some(OffsetDateTime::now_utc());
                }
                Err(e) => {
                    warn!(metric = %metric, error = %e, "Failed to load latest value");
                    self.state.last_error = Some(e.to_string());
                }
            }
        }
        &self.state
    }

    /// Fetch the latest value of every metric and fold it into the state.
    pub async fn poll(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        for metric in Metric::ALL {
            let value = match self.source.latest(metric).await {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(metric = %metric, error = %e, "Telemetry poll failed");
                    self.state.last_error = Some(e.to_string());
                    outcome.failed.push(metric);
                    None
                }
            };

            if self.state.apply(metric, value, OffsetDateTime::now_utc()) {
                outcome.updated.push(metric);
            }
        }

        if outcome.failed.is_empty() {
            self.state.last_error = None;
        }
        debug!(
            updated = outcome.updated.len(),
            failed = outcome.failed.len(),
            "Telemetry poll complete"
        );
        outcome
    }

    /// Run [`initialize`](Self::initialize) then [`poll`](Self::poll) every
    /// `period` on a background task until `cancel` fires.
    ///
    /// Each new state is published on the returned watch channel.
    pub fn spawn(
        mut self,
        period: Duration,
        cancel: CancellationToken,
    ) -> (watch::Receiver<TelemetryState>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(self.state.clone());

        let handle = tokio::spawn(async move {
            let initial = self.initialize().await.clone();
            tx.send_replace(initial);
            info!(interval_secs = period.as_secs(), "Telemetry poller started");

            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; initialization covered it.
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Telemetry poller stopped");
                        break;
                    }
                    _ = timer.tick() => {
                        self.poll().await;
                        if tx.send(self.state.clone()).is_err() {
                            debug!("All telemetry subscribers dropped");
                            break;
                        }
                    }
                }
            }
        });

        (rx, handle)
    }
}
