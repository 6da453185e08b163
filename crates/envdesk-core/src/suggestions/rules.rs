//! Fallback suggestions used when the model is unavailable.

use envdesk_types::{EnvironmentSnapshot, Metric, Reading, Suggestion, SuggestionAction, SuggestionKind};

use crate::thresholds::{RangeStatus, Thresholds, adjustment};

/// Maximum number of rule-based suggestions.
pub const MAX_RULE_SUGGESTIONS: usize = 3;

/// Id of the placeholder suggestion.
pub const PLACEHOLDER_ID: &str = "error-suggestion";

/// Command that asks the dashboard to regenerate suggestions.
pub const REFRESH_COMMAND: &str = "refresh";

/// The single suggestion shown when analysis failed.
pub fn placeholder() -> Suggestion {
    Suggestion::new(
        PLACEHOLDER_ID,
        SuggestionKind::Info,
        "Unable to analyze your workspace conditions right now.",
    )
    .with_action(SuggestionAction::new("Try again later", REFRESH_COMMAND), 0.0)
}

fn range_rule(reading: &Reading, id: &str, label: &str, parameter: f64) -> Option<Suggestion> {
    let status = Thresholds::evaluate_reading(reading);
    let (action_label, command) = adjustment(reading.metric, status)?;
    Some(
        Suggestion::new(
            id,
            SuggestionKind::Warning,
            format!(
                "{label} ({} {}) is outside optimal range.",
                reading.value, reading.unit
            ),
        )
        .with_action(SuggestionAction::new(action_label, command), parameter),
    )
}

fn noise_rule(reading: &Reading) -> Option<Suggestion> {
    if Thresholds::evaluate_reading(reading) != RangeStatus::Above {
        return None;
    }
    let (label, command) = adjustment(Metric::Noise, RangeStatus::Above)?;
    Some(
        Suggestion::new(
            "noise-high",
            SuggestionKind::Alert,
            format!("Noise level ({} {}) is too high.", reading.value, reading.unit),
        )
        .with_action(SuggestionAction::new(label, command), 10.0),
    )
}

/// Threshold-based suggestions, in order temperature, light, humidity, noise,
/// capped at [`MAX_RULE_SUGGESTIONS`].
///
/// Low noise never produces a suggestion.
pub fn rule_based(snapshot: &EnvironmentSnapshot) -> Vec<Suggestion> {
    [
        range_rule(&snapshot.temperature, "temperature-adjustment", "Temperature", 2.0),
        range_rule(&snapshot.light, "light-adjustment", "Light intensity", 20.0),
        range_rule(&snapshot.humidity, "humidity-adjustment", "Humidity", 5.0),
        noise_rule(&snapshot.noise),
    ]
    .into_iter()
    .flatten()
    .take(MAX_RULE_SUGGESTIONS)
    .collect()
}
