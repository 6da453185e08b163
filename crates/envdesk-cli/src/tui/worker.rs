//! Background worker for telemetry, suggestions and hardware commands.
//!
//! The [`DashboardWorker`] owns everything that touches the network so the
//! render loop never blocks:
//!
//! - Receives [`Command`]s from the UI
//! - Sends [`DashboardEvent`]s back with new state
//!
//! # Architecture
//!
//! The worker runs in its own Tokio task and uses `tokio::select!` over the
//! command channel and three timers: the telemetry poll, the secondary feed
//! and the periodic suggestion refresh.

use std::sync::Arc;
use std::time::Duration;

use envdesk_core::{
    Command, Config, DashboardEvent, EnvironmentFeed, MergedView, Metric, PollOutcome,
    StoreClient, Suggestion, SuggestionEngine, TelemetryPoller, TelemetrySource, change_key,
    mock_environment,
};
use envdesk_core::suggestions::parse::DEFAULT_COMMAND;
use envdesk_core::suggestions::rules::REFRESH_COMMAND;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

/// Shown when a suggestion action needs the store but none is configured.
const STORE_NOT_CONFIGURED: &str = "store not configured (set SUPABASE_URL and SUPABASE_ANON_KEY)";

/// Background worker that polls telemetry and runs the suggestion engine.
pub struct DashboardWorker {
    /// Receiver for commands from the UI thread.
    command_rx: mpsc::Receiver<Command>,
    /// Sender for events back to the UI thread.
    event_tx: mpsc::Sender<DashboardEvent>,
    poller: TelemetryPoller<dyn TelemetrySource>,
    /// Mock-seeded feed whose tracked metrics stay live.
    feed: EnvironmentFeed<dyn TelemetrySource>,
    engine: SuggestionEngine,
    store: Option<StoreClient>,
    poll_interval: Duration,
    feed_interval: Duration,
    refresh_interval: Duration,
    /// Significance key of the snapshot the current suggestions were built from.
    last_key: Option<[i64; 4]>,
}

impl DashboardWorker {
    /// Create a new worker.
    pub fn new(
        command_rx: mpsc::Receiver<Command>,
        event_tx: mpsc::Sender<DashboardEvent>,
        source: Arc<dyn TelemetrySource>,
        engine: SuggestionEngine,
        store: Option<StoreClient>,
        config: &Config,
    ) -> Self {
        let mut initial = mock_environment();
        config.thresholds().apply_to(&mut initial);

        Self {
            command_rx,
            event_tx,
            poller: TelemetryPoller::new(Arc::clone(&source), config.telemetry.history_count),
            feed: EnvironmentFeed::new(source, initial)
                .with_tracked([Metric::Light])
                .with_history_count(config.telemetry.history_count),
            engine,
            store,
            poll_interval: config.telemetry.poll_interval(),
            feed_interval: config.telemetry.feed_interval(),
            refresh_interval: config.inference.refresh_interval(),
            last_key: None,
        }
    }

    /// Run the worker's main loop.
    ///
    /// Consumes the worker and runs until [`Command::Shutdown`] arrives or
    /// the command channel closes.
    pub async fn run(mut self) {
        info!("DashboardWorker started");

        self.startup().await;

        let mut telemetry_timer = periodic(self.poll_interval);
        let mut feed_timer = periodic(self.feed_interval);
        let mut suggestion_timer = periodic(self.refresh_interval);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(Command::Shutdown) => {
                            info!("DashboardWorker received shutdown command");
                            break;
                        }
                        Some(cmd) => {
                            if self.handle_command(cmd).await {
                                suggestion_timer.reset();
                            }
                        }
                        None => {
                            info!("Command channel closed, shutting down worker");
                            break;
                        }
                    }
                }
                _ = telemetry_timer.tick() => {
                    if self.poll_telemetry().await {
                        suggestion_timer.reset();
                    }
                }
                _ = feed_timer.tick() => {
                    self.poll_feed().await;
                }
                _ = suggestion_timer.tick() => {
                    self.regenerate(false).await;
                }
            }
        }

        info!("DashboardWorker stopped");
    }

    /// Load initial state and produce the first suggestions.
    async fn startup(&mut self) {
        let state = self.poller.initialize().await.clone();
        self.send(DashboardEvent::TelemetryUpdated {
            state,
            outcome: PollOutcome::default(),
        })
        .await;

        let updated = self.feed.initialize().await;
        self.send(DashboardEvent::FeedUpdated {
            snapshot: self.feed.snapshot().clone(),
            updated,
        })
        .await;

        self.regenerate(false).await;
    }

    /// Handle a single command from the UI. Returns whether suggestions were
    /// regenerated.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        info!(?cmd, "Handling command");

        match cmd {
            Command::RefreshTelemetry => self.poll_telemetry().await,
            Command::RefreshSuggestions => self.regenerate(true).await,
            Command::ApplySuggestion { suggestion } => self.apply_suggestion(suggestion).await,
            Command::SendCommand { command, value } => {
                self.send_command(&command, value).await;
                false
            }
            Command::Shutdown => false,
        }
    }

    /// Poll telemetry and regenerate when the readings moved significantly.
    /// Returns whether suggestions were regenerated.
    async fn poll_telemetry(&mut self) -> bool {
        let outcome = self.poller.poll().await;
        if outcome.all_failed() {
            warn!(failed = outcome.failed.len(), "Every telemetry fetch failed");
        }
        self.send(DashboardEvent::TelemetryUpdated {
            state: self.poller.state().clone(),
            outcome,
        })
        .await;

        let key = change_key(&self.view().snapshot);
        if self.last_key == Some(key) {
            return false;
        }
        debug!(?key, "Readings changed significantly");
        self.regenerate(false).await
    }

    /// A failed feed fetch leaves the snapshot untouched.
    async fn poll_feed(&mut self) {
        let updated = self.feed.poll().await;
        if updated.is_empty() {
            debug!("Feed poll updated nothing, keeping previous snapshot");
        }
        self.send(DashboardEvent::FeedUpdated {
            snapshot: self.feed.snapshot().clone(),
            updated,
        })
        .await;
    }

    /// Live telemetry merged over the feed snapshot.
    fn view(&self) -> MergedView {
        MergedView::build(
            self.poller.state(),
            self.feed.snapshot(),
            OffsetDateTime::now_utc(),
        )
    }

    /// Produce a new suggestion batch.
    ///
    /// Automatic refreshes only run while some value is live; a manual
    /// refresh always runs. Returns whether a batch was produced.
    async fn regenerate(&mut self, manual: bool) -> bool {
        let view = self.view();
        let has_live = view.has_live_values();
        if !manual && !has_live {
            debug!("No live telemetry, keeping current suggestions");
            return false;
        }

        self.send(DashboardEvent::SuggestionsGenerating).await;
        let batch = self.engine.generate(&view.snapshot).await;
        self.last_key = Some(change_key(&view.snapshot));
        self.send(DashboardEvent::SuggestionsUpdated { batch }).await;
        true
    }

    async fn apply_suggestion(&mut self, suggestion: Suggestion) -> bool {
        match suggestion.command() {
            Some(REFRESH_COMMAND) => self.regenerate(true).await,
            None | Some(DEFAULT_COMMAND) => {
                self.send(DashboardEvent::Error {
                    message: "Suggestion has no action".to_string(),
                })
                .await;
                false
            }
            Some(command) => {
                let command = command.to_string();
                self.send_command(&command, suggestion.parameter).await;
                false
            }
        }
    }

    async fn send_command(&self, command: &str, value: f64) {
        let Some(store) = &self.store else {
            self.send(DashboardEvent::CommandFailed {
                command: command.to_string(),
                error: STORE_NOT_CONFIGURED.to_string(),
            })
            .await;
            return;
        };

        match store.send_command_to_hardware(command, value).await {
            Ok(row) => {
                debug!(id = %row.id, status = %row.status, "Hardware command stored");
                self.send(DashboardEvent::CommandSent {
                    command: command.to_string(),
                    value,
                })
                .await;
            }
            Err(e) => {
                warn!(command, error = %e, "Failed to queue hardware command");
                self.send(DashboardEvent::CommandFailed {
                    command: command.to_string(),
                    error: e.to_string(),
                })
                .await;
            }
        }
    }

    async fn send(&self, event: DashboardEvent) {
        if self.event_tx.send(event).await.is_err() {
            debug!("Event channel closed");
        }
    }
}

/// An interval whose first tick is one period away.
fn periodic(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

#[cfg(test)]
mod tests {
    use super::*;
    use envdesk_core::{
        EnvironmentSnapshot, FallbackMode, MockTelemetry, SuggestionAction, SuggestionKind,
    };

    type Handles = (
        mpsc::Sender<Command>,
        mpsc::Receiver<DashboardEvent>,
        tokio::task::JoinHandle<()>,
    );

    fn spawn_worker() -> Handles {
        spawn_worker_with(Arc::new(MockTelemetry::new()))
    }

    fn spawn_worker_with(source: Arc<MockTelemetry>) -> Handles {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(32);
        let source: Arc<dyn TelemetrySource> = source;
        let worker = DashboardWorker::new(
            cmd_rx,
            event_tx,
            source,
            SuggestionEngine::offline(FallbackMode::Rules),
            None,
            &Config::default(),
        );
        (cmd_tx, event_rx, tokio::spawn(worker.run()))
    }

    #[tokio::test]
    async fn test_startup_events() {
        let (cmd_tx, mut event_rx, handle) = spawn_worker();

        match event_rx.recv().await {
            Some(DashboardEvent::TelemetryUpdated { state, outcome }) => {
                assert!(state.has_live_data());
                assert_eq!(outcome, PollOutcome::default());
            }
            other => panic!("expected TelemetryUpdated, got {other:?}"),
        }
        match event_rx.recv().await {
            Some(DashboardEvent::FeedUpdated { updated, .. }) => {
                assert_eq!(updated, vec![Metric::Light]);
            }
            other => panic!("expected FeedUpdated, got {other:?}"),
        }
        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::SuggestionsGenerating)
        ));
        match event_rx.recv().await {
            Some(DashboardEvent::SuggestionsUpdated { batch }) => {
                assert!(!batch.suggestions.is_empty());
            }
            other => panic!("expected SuggestionsUpdated, got {other:?}"),
        }

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    async fn skip_startup(event_rx: &mut mpsc::Receiver<DashboardEvent>) {
        while let Some(event) = event_rx.recv().await {
            if matches!(event, DashboardEvent::SuggestionsUpdated { .. }) {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_apply_without_store_fails() {
        let (cmd_tx, mut event_rx, handle) = spawn_worker();
        skip_startup(&mut event_rx).await;

        let suggestion = Suggestion::new("s1", SuggestionKind::Warning, "Too warm")
            .with_action(SuggestionAction::new("Cool", "decrease_temperature"), 2.0);
        cmd_tx
            .send(Command::ApplySuggestion { suggestion })
            .await
            .unwrap();

        match event_rx.recv().await {
            Some(DashboardEvent::CommandFailed { command, error }) => {
                assert_eq!(command, "decrease_temperature");
                assert!(error.contains("store not configured"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_without_action_reports_error() {
        let (cmd_tx, mut event_rx, handle) = spawn_worker();
        skip_startup(&mut event_rx).await;

        let suggestion = Suggestion::new("s2", SuggestionKind::Success, "All good");
        cmd_tx
            .send(Command::ApplySuggestion { suggestion })
            .await
            .unwrap();

        match event_rx.recv().await {
            Some(DashboardEvent::Error { message }) => {
                assert_eq!(message, "Suggestion has no action");
            }
            other => panic!("expected Error, got {other:?}"),
        }

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_action_regenerates() {
        let (cmd_tx, mut event_rx, handle) = spawn_worker();
        skip_startup(&mut event_rx).await;

        let suggestion = Suggestion::new("s3", SuggestionKind::Info, "Retry")
            .with_action(SuggestionAction::new("Retry", REFRESH_COMMAND), 0.0);
        cmd_tx
            .send(Command::ApplySuggestion { suggestion })
            .await
            .unwrap();

        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::SuggestionsGenerating)
        ));
        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::SuggestionsUpdated { .. })
        ));

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_channel_closes() {
        let (cmd_tx, mut event_rx, handle) = spawn_worker();
        skip_startup(&mut event_rx).await;
        drop(cmd_tx);
        handle.await.unwrap();
    }

    /// Snapshot from the startup `FeedUpdated` event; consumes the rest of
    /// startup.
    async fn startup_feed(
        event_rx: &mut mpsc::Receiver<DashboardEvent>,
    ) -> EnvironmentSnapshot {
        let mut feed = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                DashboardEvent::FeedUpdated { snapshot, .. } => feed = Some(snapshot),
                DashboardEvent::SuggestionsUpdated { .. } => break,
                _ => {}
            }
        }
        feed.expect("startup should publish the feed")
    }

    async fn next_feed(
        event_rx: &mut mpsc::Receiver<DashboardEvent>,
    ) -> (EnvironmentSnapshot, Vec<Metric>) {
        loop {
            match event_rx.recv().await {
                Some(DashboardEvent::FeedUpdated { snapshot, updated }) => {
                    return (snapshot, updated);
                }
                Some(_) => {}
                None => panic!("worker stopped before the feed refreshed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_refresh_updates_light() {
        let source = Arc::new(MockTelemetry::new());
        let (cmd_tx, mut event_rx, handle) = spawn_worker_with(Arc::clone(&source));
        let before = startup_feed(&mut event_rx).await;

        source.set_value(Metric::Light, 400.0).await;
        let (snapshot, updated) = next_feed(&mut event_rx).await;

        assert_eq!(updated, vec![Metric::Light]);
        assert_eq!(snapshot.light.value, 400.0);
        assert_eq!(snapshot.light.history.latest().map(|p| p.value), Some(400.0));
        assert_eq!(snapshot.light.history.len(), before.light.history.len());
        assert_eq!(snapshot.temperature, before.temperature);

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_feed_refresh_keeps_snapshot() {
        let source = Arc::new(MockTelemetry::new());
        source.set_value(Metric::Light, 321.0).await;
        let (cmd_tx, mut event_rx, handle) = spawn_worker_with(Arc::clone(&source));
        let before = startup_feed(&mut event_rx).await;
        assert_eq!(before.light.value, 321.0);

        source.set_should_fail(true, None).await;
        let (snapshot, updated) = next_feed(&mut event_rx).await;

        assert!(updated.is_empty());
        assert_eq!(snapshot, before);

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_significant_change_regenerates() {
        let source = Arc::new(MockTelemetry::new());
        let (cmd_tx, mut event_rx, handle) = spawn_worker_with(Arc::clone(&source));
        skip_startup(&mut event_rx).await;

        source.set_value(Metric::Temperature, 30.0).await;
        match event_rx.recv().await {
            Some(DashboardEvent::TelemetryUpdated { state, outcome }) => {
                assert!(outcome.failed.is_empty());
                assert_eq!(state.latest(Metric::Temperature), Some(30.0));
            }
            other => panic!("expected TelemetryUpdated, got {other:?}"),
        }
        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::SuggestionsGenerating)
        ));
        match event_rx.recv().await {
            Some(DashboardEvent::SuggestionsUpdated { batch }) => {
                assert!(
                    batch
                        .suggestions
                        .iter()
                        .any(|s| s.command() == Some("decrease_temperature"))
                );
            }
            other => panic!("expected SuggestionsUpdated, got {other:?}"),
        }

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_readings_do_not_regenerate() {
        let (cmd_tx, mut event_rx, handle) = spawn_worker();
        skip_startup(&mut event_rx).await;

        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::TelemetryUpdated { .. })
        ));
        let next = event_rx.recv().await;
        assert!(
            matches!(
                next,
                Some(DashboardEvent::TelemetryUpdated { .. } | DashboardEvent::FeedUpdated { .. })
            ),
            "unexpected event {next:?}"
        );

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_regeneration_restarts_refresh_timer() {
        let start = Instant::now();
        let source = Arc::new(MockTelemetry::new());
        let (cmd_tx, mut event_rx, handle) = spawn_worker_with(Arc::clone(&source));
        skip_startup(&mut event_rx).await;

        source.set_value(Metric::Temperature, 30.0).await;
        let mut generated_at = Vec::new();
        while generated_at.len() < 2 {
            match event_rx.recv().await {
                Some(DashboardEvent::SuggestionsGenerating) => generated_at.push(start.elapsed()),
                Some(_) => {}
                None => panic!("worker stopped"),
            }
        }

        assert_eq!(generated_at[0], Duration::from_secs(15));
        assert!(generated_at[1] >= Duration::from_secs(315));

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_live_data_skips_automatic_refresh() {
        let source = Arc::new(MockTelemetry::new());
        source.set_should_fail(true, None).await;
        let (cmd_tx, mut event_rx, handle) = spawn_worker_with(source);

        let watched = tokio::time::timeout(Duration::from_secs(301), async {
            while let Some(event) = event_rx.recv().await {
                match event {
                    DashboardEvent::TelemetryUpdated { state, .. } => {
                        assert!(!state.has_live_data());
                    }
                    DashboardEvent::FeedUpdated { updated, .. } => assert!(updated.is_empty()),
                    other => panic!("unexpected event without live data: {other:?}"),
                }
            }
        })
        .await;
        assert!(watched.is_err(), "worker should still be running");

        cmd_tx.send(Command::RefreshSuggestions).await.unwrap();
        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::SuggestionsGenerating)
        ));
        assert!(matches!(
            event_rx.recv().await,
            Some(DashboardEvent::SuggestionsUpdated { .. })
        ));

        cmd_tx.send(Command::Shutdown).await.unwrap();
        handle.await.unwrap();
    }
}
