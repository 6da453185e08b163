//! Pomodoro countdown state machine.
//!
//! ```text
//!          start            expiry / skip
//!  idle ──────────► work ───────────────► break | longBreak
//!   ▲                ▲                            │
//!   │ stop           └────── expiry / skip ───────┘
//!   └──────────── (any state)
//! ```
//!
//! The machine is driven by the caller: [`Pomodoro::tick`] must be called once
//! per elapsed second. Every transition returns the [`PomodoroEvent`] it caused,
//! if any, so the UI can notify the user.

use envdesk_types::{PomodoroSettings, PomodoroState, PomodoroStatus};
use tracing::{debug, info};

use crate::config::{ConfigError, ValidationError};

/// Something that happened to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroEvent {
    /// A work session started from idle.
    Started,
    /// The countdown was paused.
    Paused,
    /// The countdown was resumed.
    Resumed,
    /// A phase ran out and the next one was loaded.
    PhaseCompleted {
        /// Phase that ended.
        from: PomodoroStatus,
        /// Phase that was loaded.
        to: PomodoroStatus,
        /// Completed work sessions after the transition.
        session_count: u32,
    },
    /// The user skipped to the next phase.
    Skipped {
        /// Phase that was skipped.
        from: PomodoroStatus,
        /// Phase that was loaded.
        to: PomodoroStatus,
    },
    /// The timer was reset to idle.
    Stopped,
    /// Durations changed and the current phase was reloaded.
    SettingsChanged,
}

/// Check that durations are at least one minute and the long-break cadence is
/// at least one session.
pub fn validate_settings(settings: &PomodoroSettings) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let durations = [
        ("pomodoro.work_duration", settings.work_duration),
        ("pomodoro.break_duration", settings.break_duration),
        ("pomodoro.long_break_duration", settings.long_break_duration),
    ];
    for (field, minutes) in durations {
        if minutes == 0 {
            errors.push(ValidationError::new(field, "must be at least 1 minute"));
        }
    }
    if settings.sessions_before_long_break == 0 {
        errors.push(ValidationError::new(
            "pomodoro.sessions_before_long_break",
            "must be at least 1",
        ));
    }
    errors
}

/// Format seconds as `MM:SS`.
///
/// ```
/// use envdesk_core::pomodoro::format_time;
///
/// assert_eq!(format_time(1500), "25:00");
/// assert_eq!(format_time(61), "01:01");
/// assert_eq!(format_time(0), "00:00");
/// ```
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// A Pomodoro timer.
#[derive(Debug, Clone, Default)]
pub struct Pomodoro {
    settings: PomodoroSettings,
    state: PomodoroState,
}

impl Pomodoro {
    /// Create an idle timer with `settings`.
    pub fn new(settings: PomodoroSettings) -> Self {
        Self {
            settings,
            state: PomodoroState::IDLE,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    /// Current state.
    pub fn state(&self) -> PomodoroState {
        self.state
    }

    /// Current phase.
    pub fn status(&self) -> PomodoroStatus {
        self.state.status
    }

    /// Whether the countdown is advancing.
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Start a work session. Only valid from idle.
    pub fn start(&mut self) -> Option<PomodoroEvent> {
        if self.state.status != PomodoroStatus::Idle {
            return None;
        }
        self.load(PomodoroStatus::Work);
        self.state.is_running = true;
        info!(minutes = self.settings.work_duration, "Pomodoro started");
        Some(PomodoroEvent::Started)
    }

    /// Pause the countdown.
    pub fn pause(&mut self) -> Option<PomodoroEvent> {
        if self.state.status == PomodoroStatus::Idle || !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        Some(PomodoroEvent::Paused)
    }

    /// Resume a paused countdown.
    pub fn resume(&mut self) -> Option<PomodoroEvent> {
        if self.state.status == PomodoroStatus::Idle || self.state.is_running {
            return None;
        }
        self.state.is_running = true;
        Some(PomodoroEvent::Resumed)
    }

    /// Start from idle, otherwise pause or resume.
    pub fn toggle(&mut self) -> Option<PomodoroEvent> {
        match (self.state.status, self.state.is_running) {
            (PomodoroStatus::Idle, _) => self.start(),
            (_, true) => self.pause(),
            (_, false) => self.resume(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero fires the expiry in the same call.
    pub fn tick(&mut self) -> Option<PomodoroEvent> {
        if !self.state.is_running || self.state.status == PomodoroStatus::Idle {
            return None;
        }
        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining > 0 {
            return None;
        }

        let from = self.state.status;
        let to = self.advance();
        info!(%from, %to, sessions = self.state.session_count, "Pomodoro phase completed");
        Some(PomodoroEvent::PhaseCompleted {
            from,
            to,
            session_count: self.state.session_count,
        })
    }

    /// Jump to the next phase immediately.
    pub fn skip(&mut self) -> Option<PomodoroEvent> {
        if self.state.status == PomodoroStatus::Idle {
            return None;
        }
        let from = self.state.status;
        let to = self.advance();
        debug!(%from, %to, "Pomodoro phase skipped");
        Some(PomodoroEvent::Skipped { from, to })
    }

    /// Reset to idle.
    pub fn stop(&mut self) -> Option<PomodoroEvent> {
        let was_idle = self.state == PomodoroState::IDLE;
        self.state = PomodoroState::IDLE;
        (!was_idle).then_some(PomodoroEvent::Stopped)
    }

    /// Replace the settings and reload the current phase's countdown.
    pub fn update_settings(
        &mut self,
        settings: PomodoroSettings,
    ) -> Result<PomodoroEvent, ConfigError> {
        let errors = validate_settings(&settings);
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        self.settings = settings;
        self.state.seconds_remaining = self.settings.seconds_for(self.state.status);
        Ok(PomodoroEvent::SettingsChanged)
    }

    /// Session number shown to the user: the running session counts while
    /// working.
    pub fn display_session(&self) -> u32 {
        self.state.session_count + u32::from(self.state.status == PomodoroStatus::Work)
    }

    /// Remaining time as `MM:SS`.
    pub fn format_time_left(&self) -> String {
        format_time(self.state.seconds_remaining)
    }

    /// Fraction of the current phase already elapsed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let total = self.settings.seconds_for(self.state.status);
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.state.seconds_remaining);
        (f64::from(elapsed) / f64::from(total)).clamp(0.0, 1.0)
    }

    fn next_status(&mut self) -> PomodoroStatus {
        match self.state.status {
            PomodoroStatus::Work => {
                self.state.session_count += 1;
                let cadence = self.settings.sessions_before_long_break.max(1);
                if self.state.session_count % cadence == 0 {
                    PomodoroStatus::LongBreak
                } else {
                    PomodoroStatus::Break
                }
            }
            PomodoroStatus::Break | PomodoroStatus::LongBreak | PomodoroStatus::Idle => {
                PomodoroStatus::Work
            }
        }
    }

    fn advance(&mut self) -> PomodoroStatus {
        let next = self.next_status();
        self.load(next);
        next
    }

    fn load(&mut self, status: PomodoroStatus) {
        self.state.status = status;
        self.state.seconds_remaining = self.settings.seconds_for(status);
    }
}
