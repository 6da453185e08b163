//! Main UI layout and rendering for the dashboard.
//!
//! The layout consists of:
//!
//! - **Header**: title, data source and timer summary
//! - **Tab bar**: Dashboard, Pomodoro, Suggestions, Settings
//! - **Content**: the active tab
//! - **Status bar**: spinner, status messages or key hints, and the clock

pub mod colors;
pub mod theme;
pub mod widgets;

mod dashboard;
mod overlays;
mod pomodoro;
mod settings;
mod suggestions;

use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use super::app::{App, Tab, Theme};
use colors::phase_color;
use theme::BORDER_TYPE;

/// Draw the complete TUI interface.
pub fn draw(frame: &mut Frame, app: &App) {
    if matches!(app.theme, Theme::Light) {
        frame.render_widget(
            Block::default().style(Style::default().bg(app.theme.bg())),
            frame.area(),
        );
    }

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, main_layout[0], app);
    draw_tab_bar(frame, main_layout[1], app);

    let area = main_layout[2];
    match app.active_tab {
        Tab::Dashboard => dashboard::draw_dashboard(frame, area, app),
        Tab::Pomodoro => pomodoro::draw_pomodoro(frame, area, app),
        Tab::Suggestions => suggestions::draw_suggestions(frame, area, app),
        Tab::Settings => settings::draw_settings_panel(frame, area, app),
    }

    draw_status_bar(frame, main_layout[3], app);

    if app.show_help {
        overlays::draw_help_overlay(frame, app);
    }
}

/// Header with data source, timer summary and indicators.
fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let mut spans = vec![
        Span::styled(
            " Workspace Monitor ",
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION"), " "),
            Style::default().fg(theme.text_muted),
        ),
    ];

    if app.view.has_live_values() {
        spans.push(Span::styled(" LIVE ", Style::default().fg(theme.success)));
    } else {
        spans.push(Span::styled(" MOCK ", Style::default().fg(theme.warning)));
    }

    let status = app.pomodoro.status();
    spans.push(Span::styled(
        format!(" {} {} ", status.title(), app.pomodoro.format_time_left()),
        Style::default().fg(phase_color(status, &theme)),
    ));
    if status.is_break() || app.pomodoro.is_running() {
        spans.push(Span::styled(
            format!(" #{} ", app.pomodoro.display_session()),
            Style::default().fg(theme.text_secondary),
        ));
    }

    if app.bell_enabled {
        spans.push(Span::styled(" BELL ", Style::default().fg(theme.warning)));
    }
    if app.last_error.is_some() {
        spans.push(Span::styled(" ERR ", Style::default().fg(theme.danger)));
    }

    let header = Paragraph::new(Line::from(spans)).style(theme.header_style());
    frame.render_widget(header, area);
}

/// Context-sensitive key hints.
fn context_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("?", "help")];

    match app.active_tab {
        Tab::Dashboard => {
            hints.push(("r", "refresh"));
            hints.push(("g", "suggest"));
        }
        Tab::Pomodoro => {
            let toggle = if app.pomodoro.is_running() { "pause" } else { "start" };
            hints.push(("space", toggle));
            hints.push(("n", "skip"));
            hints.push(("x", "reset"));
        }
        Tab::Suggestions => {
            hints.push(("j/k", "select"));
            hints.push(("enter", "apply"));
            hints.push(("g", "regenerate"));
        }
        Tab::Settings => {
            hints.push(("j/k", "select"));
            hints.push(("+/-", "adjust"));
            hints.push(("b", "bell"));
        }
    }

    hints.push(("q", "quit"));
    hints
}

/// Status bar with spinner, latest message or key hints, and the clock.
fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();
    let time_str = Local::now().format("%H:%M:%S").to_string();

    let left_spans = if app.generating {
        vec![
            Span::styled(
                format!("{} ", app.spinner_char()),
                Style::default().fg(theme.primary),
            ),
            Span::styled(
                "Generating suggestions...",
                Style::default().fg(theme.text_secondary),
            ),
        ]
    } else if let Some(msg) = app.current_status_message() {
        vec![Span::styled(
            format!(" {}", msg),
            Style::default().fg(theme.text_secondary),
        )]
    } else {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in context_hints(app).iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", Style::default().fg(theme.text_muted)));
            }
            spans.push(Span::styled(
                *key,
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}", desc),
                Style::default().fg(theme.text_muted),
            ));
        }
        spans
    };

    let status_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(10)])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(left_spans)), status_layout[0]);

    let right = Paragraph::new(time_str)
        .style(Style::default().fg(theme.text_muted))
        .alignment(Alignment::Right);
    frame.render_widget(right, status_layout[1]);
}

/// Tab bar with an underlined active tab.
fn draw_tab_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let name = format!(" {} ", tab.title());
            if *tab == app.active_tab {
                Line::from(Span::styled(
                    name,
                    Style::default()
                        .fg(theme.primary)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                ))
            } else {
                Line::from(Span::styled(name, Style::default().fg(theme.text_muted)))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BORDER_TYPE)
                .border_style(Style::default().fg(theme.border_inactive)),
        )
        .highlight_style(Style::default().fg(theme.primary))
        .divider(Span::styled(" | ", Style::default().fg(theme.text_muted)))
        .select(app.active_tab.index());

    frame.render_widget(tabs, area);
}
