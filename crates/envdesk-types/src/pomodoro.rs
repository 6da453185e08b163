//! Pomodoro timer data types.
//!
//! The state machine driving these lives in `envdesk-core`.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Pomodoro durations, in minutes, and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PomodoroSettings {
    /// Length of a work session.
    pub work_duration: u32,
    /// Length of a short break.
    pub break_duration: u32,
    /// Length of a long break.
    pub long_break_duration: u32,
    /// Work sessions completed before a long break.
    pub sessions_before_long_break: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            break_duration: 5,
            long_break_duration: 15,
            sessions_before_long_break: 4,
        }
    }
}

impl PomodoroSettings {
    /// Countdown length in seconds for `status`. Zero for [`PomodoroStatus::Idle`].
    #[must_use]
    pub fn seconds_for(&self, status: PomodoroStatus) -> u32 {
        let minutes = match status {
            PomodoroStatus::Idle => 0,
            PomodoroStatus::Work => self.work_duration,
            PomodoroStatus::Break => self.break_duration,
            PomodoroStatus::LongBreak => self.long_break_duration,
        };
        minutes.saturating_mul(60)
    }
}

/// Current phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PomodoroStatus {
    /// Not started.
    #[default]
    Idle,
    /// Focus session.
    Work,
    /// Short break.
    Break,
    /// Long break.
    LongBreak,
}

impl PomodoroStatus {
    /// Whether this is a break phase.
    #[must_use]
    pub const fn is_break(self) -> bool {
        matches!(self, PomodoroStatus::Break | PomodoroStatus::LongBreak)
    }

    /// Title shown in the UI.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            PomodoroStatus::Idle => "Ready",
            PomodoroStatus::Work => "Focus",
            PomodoroStatus::Break => "Short Break",
            PomodoroStatus::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for PomodoroStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PomodoroStatus::Idle => write!(f, "idle"),
            PomodoroStatus::Work => write!(f, "work"),
            PomodoroStatus::Break => write!(f, "break"),
            PomodoroStatus::LongBreak => write!(f, "longBreak"),
        }
    }
}

impl FromStr for PomodoroStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "idle" => Ok(PomodoroStatus::Idle),
            "work" => Ok(PomodoroStatus::Work),
            "break" => Ok(PomodoroStatus::Break),
            "longbreak" => Ok(PomodoroStatus::LongBreak),
            _ => Err(ParseError::UnknownStatus(s.to_string())),
        }
    }
}

/// Snapshot of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PomodoroState {
    /// Current phase.
    pub status: PomodoroStatus,
    /// Seconds left in the current phase.
    pub seconds_remaining: u32,
    /// Completed work sessions since the last stop.
    pub session_count: u32,
    /// Whether the countdown is advancing.
    pub is_running: bool,
}

impl PomodoroState {
    /// The stopped state: idle, nothing remaining, no sessions, not running.
    pub const IDLE: PomodoroState = PomodoroState {
        status: PomodoroStatus::Idle,
        seconds_remaining: 0,
        session_count: 0,
        is_running: false,
    };
}
