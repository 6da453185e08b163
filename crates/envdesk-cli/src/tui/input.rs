//! Keyboard input handling for the TUI.
//!
//! Translates key presses into [`Action`]s and applies them to the
//! application state.
//!
//! # Key Bindings
//!
//! | Key       | Action                 |
//! |-----------|------------------------|
//! | `q`       | Quit                   |
//! | `r`       | Refresh telemetry      |
//! | `g`       | Regenerate suggestions |
//! | `Space` / `p` | Start/pause timer  |
//! | `n`       | Skip phase             |
//! | `x`       | Reset timer            |
//! | `↓` / `j` | Select next            |
//! | `↑` / `k` | Select previous        |
//! | `Enter`   | Apply suggestion       |
//! | `+` / `-` | Adjust setting         |
//! | `Tab` / `l` | Next tab             |
//! | `BackTab` / `h` | Previous tab     |
//! | `1`-`4`   | Jump to tab            |
//! | `b`       | Toggle bell            |
//! | `t`       | Toggle theme           |
//! | `?`       | Toggle help            |

use crossterm::event::KeyCode;
use envdesk_core::Command;

use super::app::{App, Tab};

/// User actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Poll telemetry now.
    RefreshTelemetry,
    /// Regenerate suggestions now.
    RefreshSuggestions,
    /// Start, pause or resume the timer.
    TogglePomodoro,
    /// Skip to the next timer phase.
    SkipPhase,
    /// Reset the timer.
    StopPomodoro,
    /// Move the selection down.
    SelectNext,
    /// Move the selection up.
    SelectPrevious,
    /// Act on the selected item.
    Activate,
    /// Increase the selected setting.
    Increase,
    /// Decrease the selected setting.
    Decrease,
    /// Switch to the next tab.
    NextTab,
    /// Switch to the previous tab.
    PreviousTab,
    /// Jump to a tab.
    GoToTab(Tab),
    /// Toggle the phase-completion bell.
    ToggleBell,
    /// Toggle dark/light theme.
    ToggleTheme,
    /// Toggle the help overlay.
    ToggleHelp,
    /// Close overlays.
    Dismiss,
    /// No action.
    None,
}

/// Map a key to an action.
///
/// While the help overlay is open only keys that close it, or quit, do
/// anything.
pub fn handle_key(key: KeyCode, help_visible: bool) -> Action {
    if help_visible {
        return match key {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('?') | KeyCode::Esc => Action::Dismiss,
            _ => Action::None,
        };
    }

    match key {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('r') => Action::RefreshTelemetry,
        KeyCode::Char('g') => Action::RefreshSuggestions,
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePomodoro,
        KeyCode::Char('n') => Action::SkipPhase,
        KeyCode::Char('x') => Action::StopPomodoro,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Enter => Action::Activate,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Increase,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::Decrease,
        KeyCode::Tab | KeyCode::Char('l') => Action::NextTab,
        KeyCode::BackTab | KeyCode::Char('h') => Action::PreviousTab,
        KeyCode::Char('1') => Action::GoToTab(Tab::Dashboard),
        KeyCode::Char('2') => Action::GoToTab(Tab::Pomodoro),
        KeyCode::Char('3') => Action::GoToTab(Tab::Suggestions),
        KeyCode::Char('4') => Action::GoToTab(Tab::Settings),
        KeyCode::Char('b') => Action::ToggleBell,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Esc => Action::Dismiss,
        _ => Action::None,
    }
}

/// Apply an action to the application state.
///
/// Returns a command for the worker when the action needs one.
pub fn apply_action(app: &mut App, action: Action) -> Option<Command> {
    match action {
        Action::Quit => {
            app.should_quit = true;
            None
        }
        Action::RefreshTelemetry => {
            app.push_status_message("Refreshing telemetry...".to_string());
            Some(Command::RefreshTelemetry)
        }
        Action::RefreshSuggestions => {
            app.generating = true;
            Some(Command::RefreshSuggestions)
        }
        Action::TogglePomodoro => {
            app.toggle_pomodoro();
            None
        }
        Action::SkipPhase => {
            app.skip_pomodoro();
            None
        }
        Action::StopPomodoro => {
            app.stop_pomodoro();
            None
        }
        Action::SelectNext => {
            match app.active_tab {
                Tab::Suggestions => app.select_next_suggestion(),
                Tab::Settings => app.select_setting(true),
                _ => {}
            }
            None
        }
        Action::SelectPrevious => {
            match app.active_tab {
                Tab::Suggestions => app.select_previous_suggestion(),
                Tab::Settings => app.select_setting(false),
                _ => {}
            }
            None
        }
        Action::Activate => match app.active_tab {
            Tab::Suggestions => app.apply_selected(),
            Tab::Pomodoro => {
                app.toggle_pomodoro();
                None
            }
            _ => None,
        },
        Action::Increase | Action::Decrease => {
            if app.active_tab == Tab::Settings {
                app.adjust_setting(if action == Action::Increase { 1 } else { -1 });
            }
            None
        }
        Action::NextTab => {
            app.active_tab = app.active_tab.next();
            None
        }
        Action::PreviousTab => {
            app.active_tab = app.active_tab.previous();
            None
        }
        Action::GoToTab(tab) => {
            app.active_tab = tab;
            None
        }
        Action::ToggleBell => {
            app.toggle_bell();
            None
        }
        Action::ToggleTheme => {
            app.toggle_theme();
            None
        }
        Action::ToggleHelp => {
            app.show_help = !app.show_help;
            None
        }
        Action::Dismiss => {
            app.show_help = false;
            None
        }
        Action::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envdesk_core::{Config, PomodoroStatus};
    use tokio::sync::mpsc;

    use crate::tui::app::{SettingField, Theme};

    fn app() -> App {
        let (_tx, rx) = mpsc::channel(4);
        App::new(rx, &Config::default())
    }

    #[test]
    fn test_handle_key_basic() {
        assert_eq!(handle_key(KeyCode::Char('q'), false), Action::Quit);
        assert_eq!(handle_key(KeyCode::Char('r'), false), Action::RefreshTelemetry);
        assert_eq!(handle_key(KeyCode::Char(' '), false), Action::TogglePomodoro);
        assert_eq!(handle_key(KeyCode::Char('3'), false), Action::GoToTab(Tab::Suggestions));
        assert_eq!(handle_key(KeyCode::Char('z'), false), Action::None);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        assert_eq!(handle_key(KeyCode::Char('r'), true), Action::None);
        assert_eq!(handle_key(KeyCode::Esc, true), Action::Dismiss);
        assert_eq!(handle_key(KeyCode::Char('q'), true), Action::Quit);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert!(apply_action(&mut app, Action::Quit).is_none());
        assert!(app.should_quit());
    }

    #[test]
    fn test_refresh_commands() {
        let mut app = app();
        assert_eq!(
            apply_action(&mut app, Action::RefreshTelemetry),
            Some(Command::RefreshTelemetry)
        );
        assert_eq!(
            apply_action(&mut app, Action::RefreshSuggestions),
            Some(Command::RefreshSuggestions)
        );
        assert!(app.generating);
    }

    #[test]
    fn test_tab_navigation() {
        let mut app = app();
        apply_action(&mut app, Action::NextTab);
        assert_eq!(app.active_tab, Tab::Pomodoro);
        apply_action(&mut app, Action::PreviousTab);
        apply_action(&mut app, Action::PreviousTab);
        assert_eq!(app.active_tab, Tab::Settings);
    }

    #[test]
    fn test_adjust_only_on_settings_tab() {
        let mut app = app();
        let before = app.pomodoro.settings().work_duration;
        apply_action(&mut app, Action::Increase);
        assert_eq!(app.pomodoro.settings().work_duration, before);

        app.active_tab = Tab::Settings;
        app.selected_setting = SettingField::WorkDuration;
        apply_action(&mut app, Action::Increase);
        assert_eq!(app.pomodoro.settings().work_duration, before + 1);
    }

    #[test]
    fn test_pomodoro_keys() {
        let mut app = app();
        apply_action(&mut app, Action::TogglePomodoro);
        assert_eq!(app.pomodoro.status(), PomodoroStatus::Work);
        apply_action(&mut app, Action::SkipPhase);
        assert_eq!(app.pomodoro.status(), PomodoroStatus::Break);
        apply_action(&mut app, Action::StopPomodoro);
        assert_eq!(app.pomodoro.status(), PomodoroStatus::Idle);
    }

    #[test]
    fn test_toggles() {
        let mut app = app();
        apply_action(&mut app, Action::ToggleTheme);
        assert_eq!(app.theme, Theme::Light);
        apply_action(&mut app, Action::ToggleHelp);
        assert!(app.show_help);
        apply_action(&mut app, Action::Dismiss);
        assert!(!app.show_help);
        apply_action(&mut app, Action::ToggleBell);
        assert!(!app.bell_enabled);
    }
}
