//! Color helpers for readings, suggestions and timer phases.
//!
//! | Range status | Color   |
//! |--------------|---------|
//! | Optimal      | success |
//! | Low          | warning |
//! | High         | danger  |

use envdesk_core::dashboard::DataSource;
use envdesk_core::{PomodoroStatus, RangeStatus, SuggestionKind, Trend};
use ratatui::style::Color;

use super::theme::AppTheme;

/// Color for a value relative to its optimal range.
#[must_use]
pub fn range_status_color(status: RangeStatus, theme: &AppTheme) -> Color {
    match status {
        RangeStatus::Optimal => theme.success,
        RangeStatus::Below => theme.warning,
        RangeStatus::Above => theme.danger,
    }
}

/// Color for a suggestion's severity.
#[must_use]
pub fn suggestion_color(kind: SuggestionKind, theme: &AppTheme) -> Color {
    match kind {
        SuggestionKind::Info => theme.info,
        SuggestionKind::Warning => theme.warning,
        SuggestionKind::Alert => theme.danger,
        SuggestionKind::Success => theme.success,
    }
}

/// Color for a timer phase.
#[must_use]
pub fn phase_color(status: PomodoroStatus, theme: &AppTheme) -> Color {
    match status {
        PomodoroStatus::Idle => theme.text_muted,
        PomodoroStatus::Work => theme.focus,
        PomodoroStatus::Break => theme.rest,
        PomodoroStatus::LongBreak => theme.long_rest,
    }
}

/// Color for a provenance badge.
#[must_use]
pub fn source_color(source: DataSource, theme: &AppTheme) -> Color {
    match source {
        DataSource::Live => theme.primary,
        DataSource::Fallback => theme.text_muted,
    }
}

/// Trend arrows are informational; only direction is colored.
#[must_use]
pub fn trend_color(trend: Option<Trend>, theme: &AppTheme) -> Color {
    match trend {
        Some(Trend::Increasing) | Some(Trend::Decreasing) => theme.info,
        Some(Trend::Stable) | None => theme.text_muted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_status_color() {
        let theme = AppTheme::dark();
        assert_eq!(range_status_color(RangeStatus::Optimal, &theme), theme.success);
        assert_eq!(range_status_color(RangeStatus::Above, &theme), theme.danger);
        assert_eq!(range_status_color(RangeStatus::Below, &theme), theme.warning);
    }

    #[test]
    fn test_suggestion_color() {
        let theme = AppTheme::light();
        assert_eq!(suggestion_color(SuggestionKind::Alert, &theme), theme.danger);
        assert_eq!(suggestion_color(SuggestionKind::Info, &theme), theme.info);
    }

    #[test]
    fn test_phase_color_distinguishes_breaks() {
        let theme = AppTheme::dark();
        assert_ne!(
            phase_color(PomodoroStatus::Break, &theme),
            phase_color(PomodoroStatus::LongBreak, &theme)
        );
        assert_eq!(phase_color(PomodoroStatus::Idle, &theme), theme.text_muted);
    }

    #[test]
    fn test_source_color() {
        let theme = AppTheme::dark();
        assert_eq!(source_color(DataSource::Live, &theme), theme.primary);
        assert_eq!(source_color(DataSource::Fallback, &theme), theme.text_muted);
    }
}
