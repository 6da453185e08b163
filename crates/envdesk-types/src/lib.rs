//! Platform-agnostic types for the envdesk workspace monitor.
//!
//! This crate provides the shared data model used by `envdesk-core` and the
//! `envdesk` command-line and terminal dashboard.
//!
//! # Features
//!
//! - Environmental metrics with their telemetry field mapping, units and
//!   default optimal ranges
//! - Bounded history windows of timestamped samples
//! - Suggestion records produced by the suggestion engine
//! - Pomodoro settings, status and state
//! - Error types for parsing user-supplied values
//!
//! # Example
//!
//! ```
//! use envdesk_types::{Metric, OptimalRange, Reading};
//!
//! let reading = Reading::new(Metric::Temperature, 26.0);
//! assert_eq!(reading.unit, "°C");
//! assert!(!reading.is_optimal());
//!
//! let range: OptimalRange = "21-25".parse().unwrap();
//! assert_eq!(range, Metric::Temperature.default_optimal());
//! ```

pub mod error;
pub mod pomodoro;
pub mod suggestion;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use pomodoro::{PomodoroSettings, PomodoroState, PomodoroStatus};
pub use suggestion::{Suggestion, SuggestionAction, SuggestionKind};
pub use types::{
    DEFAULT_HISTORY_LEN, DataPoint, EnvironmentSnapshot, History, Metric, OptimalRange, Reading,
    Trend,
};
