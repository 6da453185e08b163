//! Visual styling utilities for the CLI.
//!
//! Spinners and bars for long-running operations, range-status colors, and
//! table styles shared by every command.

use std::time::Duration;

use envdesk_core::RangeStatus;
use envdesk_core::dashboard::DataSource;
use envdesk_types::{PomodoroStatus, SuggestionKind, Trend};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::cli::StyleMode;

// ============================================================================
// Progress Indicators
// ============================================================================

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

const COUNTDOWN_CHARS: &str = "█▓░";

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Style for the Pomodoro countdown bar.
pub fn countdown_style(no_color: bool) -> ProgressStyle {
    let template = if no_color {
        "{prefix} [{bar:40}] {msg}"
    } else {
        "{prefix:.bold} [{bar:40.cyan/blue}] {msg}"
    };
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(COUNTDOWN_CHARS)
}

/// Create a spinner for a network operation.
pub fn operation_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Create a countdown bar for one Pomodoro phase.
pub fn countdown_bar(total_secs: u32, no_color: bool) -> ProgressBar {
    let pb = ProgressBar::new(u64::from(total_secs.max(1)));
    pb.set_style(countdown_style(no_color));
    pb
}

// ============================================================================
// Range status
// ============================================================================

/// Format a range status as a bracketed badge.
pub fn format_status_colored(status: RangeStatus, no_color: bool) -> String {
    let label = status.label();
    if no_color {
        return format!("[{}]", label);
    }
    match status {
        RangeStatus::Optimal => format!("[{}]", label.green()),
        RangeStatus::Above => format!("[{}]", label.red()),
        RangeStatus::Below => format!("[{}]", label.yellow()),
    }
}

/// Color an already formatted value by its range status.
pub fn format_value_colored(text: &str, status: RangeStatus, no_color: bool) -> String {
    if no_color {
        return text.to_string();
    }
    match status {
        RangeStatus::Optimal => format!("{}", text.green()),
        RangeStatus::Above => format!("{}", text.red()),
        RangeStatus::Below => format!("{}", text.yellow()),
    }
}

/// Format where a value came from.
pub fn format_source_badge(source: DataSource, no_color: bool) -> String {
    let badge = source.badge();
    if no_color {
        return badge.to_string();
    }
    match source {
        DataSource::Live => format!("{}", badge.cyan()),
        DataSource::Fallback => format!("{}", badge.dimmed()),
    }
}

/// Arrow for a trend, `-` when there is not enough history.
pub fn trend_indicator(trend: Option<Trend>, no_color: bool) -> &'static str {
    match trend {
        Some(Trend::Increasing) => {
            if no_color { "^" } else { "↑" }
        }
        Some(Trend::Decreasing) => {
            if no_color { "v" } else { "↓" }
        }
        Some(Trend::Stable) => {
            if no_color { "=" } else { "→" }
        }
        None => "-",
    }
}

// ============================================================================
// Suggestions and Pomodoro
// ============================================================================

/// Format a suggestion category as a badge.
pub fn format_kind_colored(kind: SuggestionKind, no_color: bool) -> String {
    let label = kind.as_str().to_ascii_uppercase();
    if no_color {
        return format!("[{}]", label);
    }
    match kind {
        SuggestionKind::Info => format!("[{}]", label.cyan()),
        SuggestionKind::Warning => format!("[{}]", label.yellow()),
        SuggestionKind::Alert => format!("[{}]", label.red().bold()),
        SuggestionKind::Success => format!("[{}]", label.green()),
    }
}

/// Format a Pomodoro phase title.
pub fn format_phase(status: PomodoroStatus, no_color: bool) -> String {
    let title = status.title();
    if no_color {
        return title.to_string();
    }
    match status {
        PomodoroStatus::Work => format!("{}", title.red().bold()),
        PomodoroStatus::Break => format!("{}", title.green().bold()),
        PomodoroStatus::LongBreak => format!("{}", title.blue().bold()),
        PomodoroStatus::Idle => format!("{}", title.dimmed()),
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Get terminal width, defaulting to 80 if detection fails.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Apply the table border style for a styling mode.
pub fn apply_table_style(table: &mut tabled::Table, style: StyleMode) {
    use tabled::settings::Style;
    match style {
        StyleMode::Rich => {
            table.with(Style::rounded());
        }
        StyleMode::Minimal => {
            table.with(Style::psql());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}
