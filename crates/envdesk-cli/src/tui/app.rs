//! Application state for the TUI.
//!
//! Holds the merged environment view, the latest suggestion batch and the
//! Pomodoro timer, plus UI navigation state.

use std::time::{Duration, Instant};

use envdesk_core::{
    Command, Config, DashboardEvent, EnvironmentSnapshot, MergedView, Pomodoro, PomodoroEvent,
    PomodoroSettings, PomodoroStatus, Suggestion, SuggestionBatch, SuggestionSource,
    TelemetryState, Thresholds, mock_environment,
};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Maximum number of queued status messages.
const MAX_STATUS_MESSAGES: usize = 5;

/// Upper bound for durations adjusted from the settings tab, in minutes.
const MAX_DURATION_MINUTES: u32 = 120;

/// Upper bound for the long-break cadence.
const MAX_SESSIONS: u32 = 12;

/// UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Get background color for this theme.
    pub fn bg(self) -> ratatui::style::Color {
        match self {
            Self::Dark => ratatui::style::Color::Reset,
            Self::Light => ratatui::style::Color::White,
        }
    }
}

/// Active tab in the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    /// Current readings with sparklines.
    #[default]
    Dashboard,
    /// Focus timer.
    Pomodoro,
    /// Workspace suggestions.
    Suggestions,
    /// Timer durations and display options.
    Settings,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Pomodoro, Tab::Suggestions, Tab::Settings];

    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Pomodoro => "Pomodoro",
            Tab::Suggestions => "Suggestions",
            Tab::Settings => "Settings",
        }
    }

    /// Position in [`Tab::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Next tab, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous tab, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Pomodoro field edited from the settings tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingField {
    #[default]
    WorkDuration,
    BreakDuration,
    LongBreakDuration,
    SessionsBeforeLongBreak,
}

impl SettingField {
    /// All fields in display order.
    pub const ALL: [SettingField; 4] = [
        SettingField::WorkDuration,
        SettingField::BreakDuration,
        SettingField::LongBreakDuration,
        SettingField::SessionsBeforeLongBreak,
    ];

    /// Label shown in the settings list.
    pub fn label(self) -> &'static str {
        match self {
            SettingField::WorkDuration => "Work duration",
            SettingField::BreakDuration => "Short break",
            SettingField::LongBreakDuration => "Long break",
            SettingField::SessionsBeforeLongBreak => "Sessions before long break",
        }
    }

    /// Unit suffix shown after the value.
    pub fn unit(self) -> &'static str {
        match self {
            SettingField::SessionsBeforeLongBreak => "",
            _ => " min",
        }
    }

    /// Read this field from `settings`.
    pub fn get(self, settings: &PomodoroSettings) -> u32 {
        match self {
            SettingField::WorkDuration => settings.work_duration,
            SettingField::BreakDuration => settings.break_duration,
            SettingField::LongBreakDuration => settings.long_break_duration,
            SettingField::SessionsBeforeLongBreak => settings.sessions_before_long_break,
        }
    }

    fn set(self, settings: &mut PomodoroSettings, value: u32) {
        match self {
            SettingField::WorkDuration => settings.work_duration = value,
            SettingField::BreakDuration => settings.break_duration = value,
            SettingField::LongBreakDuration => settings.long_break_duration = value,
            SettingField::SessionsBeforeLongBreak => settings.sessions_before_long_break = value,
        }
    }

    fn max(self) -> u32 {
        match self {
            SettingField::SessionsBeforeLongBreak => MAX_SESSIONS,
            _ => MAX_DURATION_MINUTES,
        }
    }
}

/// Main application state for the TUI.
pub struct App {
    /// Whether the application should quit.
    pub should_quit: bool,
    /// Currently active tab.
    pub active_tab: Tab,
    /// Queue of status messages with timestamps.
    pub status_messages: Vec<(String, Instant)>,
    /// How long status messages stay visible.
    pub status_message_timeout: Duration,
    /// Whether to show the help overlay.
    pub show_help: bool,
    /// Receiver for worker events.
    pub event_rx: mpsc::Receiver<DashboardEvent>,
    /// Optimal ranges applied to every snapshot.
    pub thresholds: Thresholds,
    /// Live telemetry as last reported by the worker.
    pub live: TelemetryState,
    /// Feed snapshot used for missing live values.
    pub fallback: EnvironmentSnapshot,
    /// `live` merged over `fallback`.
    pub view: MergedView,
    /// Latest suggestion batch.
    pub suggestions: Option<SuggestionBatch>,
    /// Whether a suggestion request is in flight.
    pub generating: bool,
    /// Index of the selected suggestion.
    pub selected_suggestion: usize,
    /// The focus timer.
    pub pomodoro: Pomodoro,
    /// Last time the timer advanced.
    last_tick: Instant,
    /// Ring the terminal bell when a phase completes.
    pub bell_enabled: bool,
    /// Set when the bell should ring on the next frame.
    pub pending_bell: bool,
    /// Selected row on the settings tab.
    pub selected_setting: SettingField,
    /// Current UI theme.
    pub theme: Theme,
    /// Spinner animation frame.
    pub spinner_frame: usize,
    /// Most recent worker or telemetry error.
    pub last_error: Option<String>,
}

impl App {
    /// Create a new application state.
    pub fn new(event_rx: mpsc::Receiver<DashboardEvent>, config: &Config) -> Self {
        let thresholds = config.thresholds();
        let mut fallback = mock_environment();
        thresholds.apply_to(&mut fallback);
        let live = TelemetryState::new(config.telemetry.history_count);
        let view = MergedView::build(&live, &fallback, OffsetDateTime::now_utc());

        Self {
            should_quit: false,
            active_tab: Tab::default(),
            status_messages: Vec::new(),
            status_message_timeout: Duration::from_secs(5),
            show_help: false,
            event_rx,
            thresholds,
            live,
            fallback,
            view,
            suggestions: None,
            generating: false,
            selected_suggestion: 0,
            pomodoro: Pomodoro::new(config.pomodoro),
            last_tick: Instant::now(),
            bell_enabled: true,
            pending_bell: false,
            selected_setting: SettingField::default(),
            theme: match config.display.theme.as_str() {
                "light" => Theme::Light,
                _ => Theme::Dark,
            },
            spinner_frame: 0,
            last_error: None,
        }
    }

    /// Whether the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Toggle between dark and light theme.
    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    /// Get the palette for the current theme.
    #[must_use]
    pub fn app_theme(&self) -> super::ui::theme::AppTheme {
        match self.theme {
            Theme::Dark => super::ui::theme::AppTheme::dark(),
            Theme::Light => super::ui::theme::AppTheme::light(),
        }
    }

    /// Add a status message to the queue.
    pub fn push_status_message(&mut self, message: String) {
        self.status_messages.push((message, Instant::now()));
        while self.status_messages.len() > MAX_STATUS_MESSAGES {
            self.status_messages.remove(0);
        }
    }

    /// Remove expired status messages.
    pub fn clean_expired_messages(&mut self) {
        let timeout = self.status_message_timeout;
        self.status_messages
            .retain(|(_, created)| created.elapsed() < timeout);
    }

    /// Get the current status message to display.
    pub fn current_status_message(&self) -> Option<&str> {
        self.status_messages.last().map(|(msg, _)| msg.as_str())
    }

    /// Advance the spinner animation.
    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 10;
    }

    /// Get the current spinner character.
    pub fn spinner_char(&self) -> &'static str {
        const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        SPINNER[self.spinner_frame]
    }

    /// Handle an incoming worker event.
    pub fn handle_dashboard_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::TelemetryUpdated { state, outcome } => {
                if outcome.all_failed() {
                    self.push_status_message("Telemetry unavailable, showing last values".to_string());
                }
                self.last_error = state.last_error.clone();
                self.live = state;
                self.rebuild_view();
            }
            DashboardEvent::FeedUpdated { mut snapshot, updated } => {
                debug!(?updated, "Feed updated");
                self.thresholds.apply_to(&mut snapshot);
                self.fallback = snapshot;
                self.rebuild_view();
            }
            DashboardEvent::SuggestionsGenerating => {
                self.generating = true;
            }
            DashboardEvent::SuggestionsUpdated { batch } => {
                self.generating = false;
                if batch.source != SuggestionSource::Model {
                    self.push_status_message(format!("Suggestions from {}", batch.source));
                }
                self.selected_suggestion = self
                    .selected_suggestion
                    .min(batch.suggestions.len().saturating_sub(1));
                self.suggestions = Some(batch);
            }
            DashboardEvent::CommandSent { command, value } => {
                self.push_status_message(format!("Queued {command} ({value})"));
            }
            DashboardEvent::CommandFailed { command, error } => {
                self.push_status_message(format!("{command} failed: {error}"));
                self.last_error = Some(error);
            }
            DashboardEvent::Error { message } => {
                self.push_status_message(message.clone());
                self.last_error = Some(message);
            }
        }
    }

    fn rebuild_view(&mut self) {
        self.view = MergedView::build(&self.live, &self.fallback, OffsetDateTime::now_utc());
    }

    /// Advance the Pomodoro by however many whole seconds passed since the
    /// last call.
    pub fn tick_pomodoro(&mut self) {
        let elapsed = self.last_tick.elapsed().as_secs();
        if elapsed == 0 {
            return;
        }
        self.last_tick += Duration::from_secs(elapsed);

        for _ in 0..elapsed {
            if let Some(event) = self.pomodoro.tick() {
                self.handle_pomodoro_event(event);
            }
        }
    }

    /// Start, pause or resume the timer.
    pub fn toggle_pomodoro(&mut self) {
        self.last_tick = Instant::now();
        if let Some(event) = self.pomodoro.toggle() {
            self.handle_pomodoro_event(event);
        }
    }

    /// Jump to the next phase.
    pub fn skip_pomodoro(&mut self) {
        if let Some(event) = self.pomodoro.skip() {
            self.handle_pomodoro_event(event);
        }
    }

    /// Reset the timer to idle.
    pub fn stop_pomodoro(&mut self) {
        if let Some(event) = self.pomodoro.stop() {
            self.handle_pomodoro_event(event);
        }
    }

    /// React to a timer transition.
    pub fn handle_pomodoro_event(&mut self, event: PomodoroEvent) {
        let message = match event {
            PomodoroEvent::Started => "Focus session started".to_string(),
            PomodoroEvent::Paused => "Timer paused".to_string(),
            PomodoroEvent::Resumed => "Timer resumed".to_string(),
            PomodoroEvent::PhaseCompleted { from, to, session_count } => {
                info!(%from, %to, session_count, "Phase completed");
                self.pending_bell = self.bell_enabled;
                match from {
                    PomodoroStatus::Work => format!("Session {session_count} done, time for a {}", to.title().to_lowercase()),
                    _ => "Break over, back to focus".to_string(),
                }
            }
            PomodoroEvent::Skipped { to, .. } => format!("Skipped to {}", to.title()),
            PomodoroEvent::Stopped => "Timer reset".to_string(),
            PomodoroEvent::SettingsChanged => "Timer settings updated".to_string(),
        };
        self.push_status_message(message);
    }

    /// Toggle the phase-completion bell.
    pub fn toggle_bell(&mut self) {
        self.bell_enabled = !self.bell_enabled;
        let state = if self.bell_enabled { "on" } else { "off" };
        self.push_status_message(format!("Bell {state}"));
    }

    /// Move the settings selection.
    pub fn select_setting(&mut self, forward: bool) {
        let len = SettingField::ALL.len();
        let index = SettingField::ALL
            .iter()
            .position(|f| *f == self.selected_setting)
            .unwrap_or(0);
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        self.selected_setting = SettingField::ALL[next];
    }

    /// Change the selected setting by `delta`, clamped to its bounds.
    pub fn adjust_setting(&mut self, delta: i32) {
        let field = self.selected_setting;
        let mut settings = *self.pomodoro.settings();
        let current = field.get(&settings);
        let value = current.saturating_add_signed(delta).clamp(1, field.max());
        if value == current {
            return;
        }
        field.set(&mut settings, value);

        match self.pomodoro.update_settings(settings) {
            Ok(event) => self.handle_pomodoro_event(event),
            Err(e) => self.push_status_message(e.to_string()),
        }
    }

    /// Suggestions in the current batch.
    pub fn suggestion_list(&self) -> &[Suggestion] {
        self.suggestions
            .as_ref()
            .map(|b| b.suggestions.as_slice())
            .unwrap_or_default()
    }

    /// Select the next suggestion.
    pub fn select_next_suggestion(&mut self) {
        let len = self.suggestion_list().len();
        if len > 0 {
            self.selected_suggestion = (self.selected_suggestion + 1) % len;
        }
    }

    /// Select the previous suggestion.
    pub fn select_previous_suggestion(&mut self) {
        let len = self.suggestion_list().len();
        if len > 0 {
            self.selected_suggestion = (self.selected_suggestion + len - 1) % len;
        }
    }

    /// The selected suggestion.
    pub fn selected(&self) -> Option<&Suggestion> {
        self.suggestion_list().get(self.selected_suggestion)
    }

    /// Command for acting on the selected suggestion.
    pub fn apply_selected(&mut self) -> Option<Command> {
        let Some(suggestion) = self.selected().cloned() else {
            self.push_status_message("No suggestion selected".to_string());
            return None;
        };
        if suggestion.action.is_none() {
            self.push_status_message("Suggestion has no action".to_string());
            return None;
        }
        Some(Command::ApplySuggestion { suggestion })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envdesk_core::{
        FallbackMode, Metric, PollOutcome, SuggestionAction, SuggestionEngine, SuggestionKind,
    };

    fn app() -> App {
        let (_tx, rx) = mpsc::channel(4);
        App::new(rx, &Config::default())
    }

    fn batch(suggestions: Vec<Suggestion>) -> SuggestionBatch {
        SuggestionBatch {
            suggestions,
            source: SuggestionSource::Rules,
            generated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Dashboard.next(), Tab::Pomodoro);
        assert_eq!(Tab::Settings.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.previous(), Tab::Settings);
    }

    #[test]
    fn test_initial_view_is_fallback() {
        let app = app();
        assert!(!app.view.has_live_values());
        assert!(app.suggestions.is_none());
    }

    #[test]
    fn test_status_messages_capped() {
        let mut app = app();
        for i in 0..8 {
            app.push_status_message(format!("msg {i}"));
        }
        assert_eq!(app.status_messages.len(), MAX_STATUS_MESSAGES);
        assert_eq!(app.current_status_message(), Some("msg 7"));
    }

    #[test]
    fn test_telemetry_event_updates_view() {
        let mut app = app();
        let mut state = TelemetryState::new(24);
        state.set_latest(Metric::Temperature, Some(27.0));

        app.handle_dashboard_event(DashboardEvent::TelemetryUpdated {
            state,
            outcome: PollOutcome::default(),
        });

        assert!(app.view.has_live_values());
        assert_eq!(app.view.snapshot.temperature.value, 27.0);
    }

    #[test]
    fn test_suggestions_event_clamps_selection() {
        let mut app = app();
        app.selected_suggestion = 3;
        app.handle_dashboard_event(DashboardEvent::SuggestionsGenerating);
        assert!(app.generating);

        let one = Suggestion::new("a", SuggestionKind::Info, "One");
        app.handle_dashboard_event(DashboardEvent::SuggestionsUpdated { batch: batch(vec![one]) });
        assert!(!app.generating);
        assert_eq!(app.selected_suggestion, 0);
    }

    #[tokio::test]
    async fn test_apply_selected() {
        let mut app = app();
        assert!(app.apply_selected().is_none());

        let engine = SuggestionEngine::offline(FallbackMode::Rules);
        let mut snapshot = mock_environment();
        snapshot.temperature.value = 28.0;
        let generated = engine.generate(&snapshot).await;
        app.handle_dashboard_event(DashboardEvent::SuggestionsUpdated { batch: generated });

        match app.apply_selected() {
            Some(Command::ApplySuggestion { suggestion }) => {
                assert!(suggestion.action.is_some());
            }
            other => panic!("expected ApplySuggestion, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_selected_without_action() {
        let mut app = app();
        let plain = Suggestion::new("a", SuggestionKind::Success, "All good");
        let with_action = Suggestion::new("b", SuggestionKind::Warning, "Dim")
            .with_action(SuggestionAction::new("Dim", "decrease_light"), 20.0);
        app.handle_dashboard_event(DashboardEvent::SuggestionsUpdated {
            batch: batch(vec![plain, with_action]),
        });

        assert!(app.apply_selected().is_none());
        assert_eq!(app.current_status_message(), Some("Suggestion has no action"));

        app.select_next_suggestion();
        assert!(app.apply_selected().is_some());
        app.select_next_suggestion();
        assert_eq!(app.selected_suggestion, 0);
    }

    #[test]
    fn test_adjust_setting_clamps() {
        let mut app = app();
        app.selected_setting = SettingField::BreakDuration;
        app.adjust_setting(-10);
        assert_eq!(app.pomodoro.settings().break_duration, 1);

        app.adjust_setting(1);
        assert_eq!(app.pomodoro.settings().break_duration, 2);

        app.selected_setting = SettingField::SessionsBeforeLongBreak;
        app.adjust_setting(100);
        assert_eq!(app.pomodoro.settings().sessions_before_long_break, MAX_SESSIONS);
    }

    #[test]
    fn test_select_setting_wraps() {
        let mut app = app();
        app.select_setting(false);
        assert_eq!(app.selected_setting, SettingField::SessionsBeforeLongBreak);
        app.select_setting(true);
        assert_eq!(app.selected_setting, SettingField::WorkDuration);
    }

    #[test]
    fn test_phase_completion_sets_bell() {
        let mut app = app();
        app.handle_pomodoro_event(PomodoroEvent::PhaseCompleted {
            from: PomodoroStatus::Work,
            to: PomodoroStatus::Break,
            session_count: 1,
        });
        assert!(app.pending_bell);

        app.pending_bell = false;
        app.toggle_bell();
        app.handle_pomodoro_event(PomodoroEvent::PhaseCompleted {
            from: PomodoroStatus::Break,
            to: PomodoroStatus::Work,
            session_count: 1,
        });
        assert!(!app.pending_bell);
    }

    #[test]
    fn test_toggle_pomodoro_starts_work() {
        let mut app = app();
        app.toggle_pomodoro();
        assert_eq!(app.pomodoro.status(), PomodoroStatus::Work);
        assert!(app.pomodoro.is_running());
        app.stop_pomodoro();
        assert_eq!(app.pomodoro.status(), PomodoroStatus::Idle);
    }
}
