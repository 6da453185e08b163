//! Workspace improvement suggestions.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Severity category of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SuggestionKind {
    /// General information.
    #[default]
    Info,
    /// Something drifting out of range.
    Warning,
    /// Needs attention now.
    Alert,
    /// Conditions are good.
    Success,
}

impl SuggestionKind {
    /// Map a free-form category string to a kind, defaulting to [`SuggestionKind::Info`].
    #[must_use]
    pub fn from_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Lowercase name as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SuggestionKind::Info => "info",
            SuggestionKind::Warning => "warning",
            SuggestionKind::Alert => "alert",
            SuggestionKind::Success => "success",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(SuggestionKind::Info),
            "warning" => Ok(SuggestionKind::Warning),
            "alert" => Ok(SuggestionKind::Alert),
            "success" => Ok(SuggestionKind::Success),
            _ => Err(ParseError::InvalidData(format!(
                "unknown suggestion type: {s}"
            ))),
        }
    }
}

/// An action the user can take on a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuggestionAction {
    /// Button label.
    pub label: String,
    /// Hardware command name, e.g. `decrease_temperature`.
    pub command: String,
}

impl SuggestionAction {
    /// Create a new action.
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// A single suggestion shown on the dashboard.
///
/// Suggestions are regenerated as a whole on each cycle and never persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Suggestion {
    /// Unique id within a generation cycle.
    pub id: String,
    /// Severity category.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub category: SuggestionKind,
    /// Message shown to the user.
    pub message: String,
    /// Optional action.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub action: Option<SuggestionAction>,
    /// Magnitude for the action's command.
    pub parameter: f64,
}

impl Suggestion {
    /// Create a suggestion without an action.
    pub fn new(id: impl Into<String>, category: SuggestionKind, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            message: message.into(),
            action: None,
            parameter: 0.0,
        }
    }

    /// Attach an action and its parameter.
    #[must_use]
    pub fn with_action(mut self, action: SuggestionAction, parameter: f64) -> Self {
        self.action = Some(action);
        self.parameter = parameter;
        self
    }

    /// The action's command, if any.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.action.as_ref().map(|a| a.command.as_str())
    }
}
