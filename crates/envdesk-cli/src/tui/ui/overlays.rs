//! Help overlay.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::theme::{AppTheme, BORDER_TYPE};
use crate::tui::app::App;

/// Draw the keyboard shortcut overlay.
pub(super) fn draw_help_overlay(frame: &mut Frame, app: &App) {
    let theme = app.app_theme();

    let area = frame.area();
    let width = (area.width * 70 / 100)
        .max(60)
        .min(area.width.saturating_sub(2));
    let height = (area.height * 70 / 100)
        .max(18)
        .min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;

    let help_area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, help_area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(help_area);

    let left_lines = vec![
        section("Navigation", &theme),
        Line::from(""),
        shortcut_line("Tab/Shift+Tab", "Next/Prev tab", &theme),
        shortcut_line("l/h", "Next/Prev tab", &theme),
        shortcut_line("1-4", "Jump to tab", &theme),
        shortcut_line("j/k", "Select next/prev", &theme),
        Line::from(""),
        section("Environment", &theme),
        Line::from(""),
        shortcut_line("r", "Refresh telemetry", &theme),
        shortcut_line("g", "Regenerate suggestions", &theme),
        shortcut_line("Enter", "Apply suggestion", &theme),
    ];

    let right_lines = vec![
        section("Timer", &theme),
        Line::from(""),
        shortcut_line("Space/p", "Start/pause", &theme),
        shortcut_line("n", "Skip phase", &theme),
        shortcut_line("x", "Reset", &theme),
        shortcut_line("+/-", "Adjust setting", &theme),
        Line::from(""),
        section("Other", &theme),
        Line::from(""),
        shortcut_line("b", "Toggle bell", &theme),
        shortcut_line("t", "Toggle theme", &theme),
        shortcut_line("q", "Quit", &theme),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(theme.text_muted),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(theme.border_active_style())
        .title(Span::styled(" Keyboard Shortcuts ", theme.title_style()));

    frame.render_widget(block, help_area);
    frame.render_widget(Paragraph::new(left_lines), columns[0]);
    frame.render_widget(Paragraph::new(right_lines), columns[1]);
}

fn section<'a>(title: &str, theme: &AppTheme) -> Line<'a> {
    Line::from(Span::styled(
        format!("--- {title} ---"),
        Style::default()
            .fg(theme.primary)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Key and description on one line.
fn shortcut_line<'a>(key: &str, desc: &str, theme: &AppTheme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:>13} ", key), Style::default().fg(theme.warning)),
        Span::styled(desc.to_string(), Style::default().fg(theme.text_secondary)),
    ])
}
