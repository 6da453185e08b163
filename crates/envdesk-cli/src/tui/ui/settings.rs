//! Settings tab: timer durations, bell and theme, and the optimal ranges in
//! effect.

use envdesk_core::Metric;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::theme::BORDER_TYPE;
use crate::tui::app::{App, SettingField, Theme};

/// Label column width.
const LABEL_WIDTH: usize = 28;

pub(super) fn draw_settings_panel(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let block = Block::default()
        .title(Span::styled(" Settings ", theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(theme.border_active_style());

    let muted = Style::default().fg(theme.text_muted);
    let settings = app.pomodoro.settings();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Pomodoro:", Style::default().fg(theme.primary))),
        Line::from(""),
    ];

    for field in SettingField::ALL {
        let value_style = if field == app.selected_setting {
            theme.selected_style()
        } else {
            Style::default().fg(theme.text_primary)
        };
        let mut spans = vec![
            Span::styled(format!("  {:<LABEL_WIDTH$}", format!("{}:", field.label())), muted),
            Span::styled(format!("[{}{}]", field.get(settings), field.unit()), value_style),
        ];
        if field == app.selected_setting {
            spans.push(Span::styled(" (+/- to adjust)", muted));
        }
        lines.push(Line::from(spans));
    }

    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    let theme_name = match app.theme {
        Theme::Dark => "dark",
        Theme::Light => "light",
    };

    lines.extend([
        Line::from(""),
        Line::from(Span::styled("  Display:", Style::default().fg(theme.primary))),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {:<LABEL_WIDTH$}", "Bell:"), muted),
            Span::styled(on_off(app.bell_enabled), Style::default().fg(theme.text_primary)),
            Span::styled(" (b to toggle)", muted),
        ]),
        Line::from(vec![
            Span::styled(format!("  {:<LABEL_WIDTH$}", "Theme:"), muted),
            Span::styled(theme_name, Style::default().fg(theme.text_primary)),
            Span::styled(" (t to toggle)", muted),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Optimal ranges:", Style::default().fg(theme.primary))),
        Line::from(""),
    ]);

    for metric in Metric::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<LABEL_WIDTH$}", format!("{}:", metric.label())), muted),
            Span::styled(
                format!("{} {}", app.thresholds.range(metric), metric.unit()),
                Style::default().fg(theme.text_primary),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
