//! Message types for UI/worker communication.
//!
//! The dashboard UI owns rendering and the Pomodoro timer; a background worker
//! owns the telemetry poller, the secondary feed and the suggestion engine.
//!
//! ```text
//! +------------------+     Command      +------------------+
//! |    UI loop       | --------------> | DashboardWorker  |
//! |    (ratatui)     |                 | (tokio runtime)  |
//! |                  | <-------------- |                  |
//! +------------------+ DashboardEvent  +------------------+
//! ```

use envdesk_types::{EnvironmentSnapshot, Metric, Suggestion};

use crate::poller::{PollOutcome, TelemetryState};
use crate::suggestions::SuggestionBatch;

/// Commands sent from the UI to the background worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Poll telemetry now instead of waiting for the next interval.
    RefreshTelemetry,

    /// Regenerate suggestions now.
    RefreshSuggestions,

    /// Act on a suggestion: `refresh` regenerates, anything else is sent to
    /// the hardware.
    ApplySuggestion {
        /// The suggestion chosen by the user.
        suggestion: Suggestion,
    },

    /// Queue a hardware command directly.
    SendCommand {
        /// Command identifier.
        command: String,
        /// Adjustment amount.
        value: f64,
    },

    /// Stop the worker.
    Shutdown,
}

/// Events sent from the worker back to the UI.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// The telemetry poller finished a cycle.
    TelemetryUpdated {
        /// Live state after the cycle.
        state: TelemetryState,
        /// What changed.
        outcome: PollOutcome,
    },

    /// The secondary feed refreshed.
    FeedUpdated {
        /// Feed snapshot, used as the fallback for missing live data.
        snapshot: EnvironmentSnapshot,
        /// Metrics that received live values.
        updated: Vec<Metric>,
    },

    /// A suggestion request is in flight.
    SuggestionsGenerating,

    /// A new batch replaced the previous suggestions.
    SuggestionsUpdated {
        /// The new batch.
        batch: SuggestionBatch,
    },

    /// A hardware command was queued.
    CommandSent {
        /// Command identifier.
        command: String,
        /// Adjustment amount.
        value: f64,
    },

    /// A hardware command could not be queued.
    CommandFailed {
        /// Command identifier.
        command: String,
        /// Error description.
        error: String,
    },

    /// A non-fatal worker error worth showing in the status bar.
    Error {
        /// Error description.
        message: String,
    },
}
