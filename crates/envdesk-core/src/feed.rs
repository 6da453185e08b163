//! Secondary environment feed.
//!
//! The feed starts from mock readings and replaces a small set of tracked
//! metrics (light by default) with live telemetry. It refreshes on its own,
//! slower interval than [`crate::poller::TelemetryPoller`] and its snapshot is
//! what the dashboard falls back to for any metric without live data.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, warn};

use envdesk_types::{DataPoint, EnvironmentSnapshot, History, Metric};

use crate::telemetry::TelemetrySource;

/// Default secondary feed interval.
pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(30);

/// A mock-seeded snapshot with selected metrics kept live.
pub struct EnvironmentFeed<S: TelemetrySource + ?Sized> {
    source: Arc<S>,
    tracked: Vec<Metric>,
    history_count: usize,
    snapshot: EnvironmentSnapshot,
}

impl<S: TelemetrySource + ?Sized> std::fmt::Debug for EnvironmentFeed<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentFeed")
            .field("tracked", &self.tracked)
            .field("history_count", &self.history_count)
            .finish()
    }
}

impl<S: TelemetrySource + ?Sized> EnvironmentFeed<S> {
    /// Create a feed over `initial` that tracks light.
    pub fn new(source: Arc<S>, initial: EnvironmentSnapshot) -> Self {
        Self {
            source,
            tracked: vec![Metric::Light],
            history_count: initial.light.history.capacity(),
            snapshot: initial,
        }
    }

    /// Track a different set of metrics.
    pub fn with_tracked(mut self, metrics: impl IntoIterator<Item = Metric>) -> Self {
        self.tracked = metrics.into_iter().collect();
        self.tracked.sort();
        self.tracked.dedup();
        self
    }

    /// Number of history points requested when initializing.
    pub fn with_history_count(mut self, count: usize) -> Self {
        self.history_count = count.max(1);
        self
    }

    /// Metrics this feed keeps live.
    pub fn tracked(&self) -> &[Metric] {
        &self.tracked
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &EnvironmentSnapshot {
        &self.snapshot
    }

    /// Replace each tracked metric with live data, but only when both its
    /// history and its latest value are available. Returns the replaced metrics.
    pub async fn initialize(&mut self) -> Vec<Metric> {
        let mut replaced = Vec::new();

        for metric in self.tracked.clone() {
            let history = match self.source.history(metric, self.history_count).await {
                Ok(points) => points,
                Err(e) => {
                    warn!(metric = %metric, error = %e, "Feed history unavailable");
                    Vec::new()
                }
            };
            let latest = match self.source.latest(metric).await {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(metric = %metric, error = %e, "Feed latest value unavailable");
                    None
                }
            };

            if let (false, Some(value)) = (history.is_empty(), latest) {
                let reading = self.snapshot.get_mut(metric);
                reading.value = value;
                reading.history = History::from_points(self.history_count, history);
                self.snapshot.timestamp = OffsetDateTime::now_utc();
                replaced.push(metric);
            } else {
                debug!(metric = %metric, "Keeping mock data for metric");
            }
        }

        replaced
    }

    /// Refresh tracked metrics. A failed fetch leaves the metric unchanged.
    pub async fn poll(&mut self) -> Vec<Metric> {
        let mut updated = Vec::new();

        for metric in self.tracked.clone() {
            match self.source.latest(metric).await {
                Ok(value) => {
                    let now = OffsetDateTime::now_utc();
                    let reading = self.snapshot.get_mut(metric);
                    reading.value = value;
                    reading.history.push(DataPoint::new(value, now));
                    self.snapshot.timestamp = now;
                    updated.push(metric);
                }
                Err(e) => {
                    warn!(metric = %metric, error = %e, "Feed update failed");
                }
            }
        }

        updated
    }
}
