//! Dashboard tab: one panel per metric with its value, range status,
//! trend, provenance and a history sparkline.

use envdesk_core::trend::history_trend;
use envdesk_core::{Metric, Reading, Thresholds};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};

use super::colors::{range_status_color, source_color, trend_color};
use super::theme::{AppTheme, BORDER_TYPE};
use super::widgets::{format_reading, resample_sparkline_data, sparkline_data, trend_arrow};
use crate::tui::app::App;

/// Draw the 2x2 metric grid and the footer line.
pub(super) fn draw_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
            Constraint::Length(1),
        ])
        .split(area);

    let grid = [Metric::Light, Metric::Temperature, Metric::Humidity, Metric::Noise];
    for (row, metrics) in grid.chunks(2).enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[row]);
        for (col, metric) in metrics.iter().enumerate() {
            draw_metric_panel(frame, cols[col], app, *metric, &theme);
        }
    }

    draw_footer(frame, rows[2], app, &theme);
}

fn draw_metric_panel(frame: &mut Frame, area: Rect, app: &App, metric: Metric, theme: &AppTheme) {
    let reading = app.view.snapshot.get(metric);
    let provenance = app.view.provenance(metric);
    let status = Thresholds::evaluate_reading(reading);
    let color = range_status_color(status, theme);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", metric.label()))
        .title_style(Style::default().fg(theme.text_primary))
        .title_bottom(
            Line::from(Span::styled(
                format!(" {} ", provenance.value.badge()),
                Style::default().fg(source_color(provenance.value, theme)),
            ))
            .right_aligned(),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Value and trend
            Constraint::Length(1), // Status and optimal range
            Constraint::Min(0),    // Sparkline
        ])
        .split(inner);

    frame.render_widget(value_line(reading, color, theme), layout[0]);

    let details = Line::from(vec![
        Span::styled(status.label(), Style::default().fg(color)),
        Span::styled(
            format!("  optimal {} {}", reading.optimal, reading.unit),
            theme.muted_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(details).alignment(Alignment::Center), layout[1]);

    let spark_area = layout[2];
    if spark_area.height == 0 {
        return;
    }
    let data = sparkline_data(&reading.history);
    if data.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No history yet", theme.muted_style()))
                .alignment(Alignment::Center),
            spark_area,
        );
        return;
    }
    let data = resample_sparkline_data(&data, usize::from(spark_area.width));
    let history_color = source_color(provenance.history, theme);
    frame.render_widget(
        Sparkline::default()
            .data(&data)
            .style(Style::default().fg(history_color)),
        spark_area,
    );
}

fn value_line(reading: &Reading, color: Color, theme: &AppTheme) -> Paragraph<'static> {
    let trend = history_trend(&reading.history);
    Paragraph::new(Line::from(vec![
        Span::styled(
            format_reading(reading.metric, reading.value),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(trend_arrow(trend), Style::default().fg(trend_color(trend, theme))),
    ]))
    .alignment(Alignment::Center)
}

/// Last update time and the most recent error.
fn draw_footer(frame: &mut Frame, area: Rect, app: &App, theme: &AppTheme) {
    let mut spans = Vec::new();
    match app.live.last_update {
        Some(at) => spans.push(Span::styled(
            format!(" Updated {:02}:{:02}:{:02} UTC", at.hour(), at.minute(), at.second()),
            theme.muted_style(),
        )),
        None => spans.push(Span::styled(" Waiting for telemetry", theme.muted_style())),
    }
    if let Some(error) = &app.last_error {
        spans.push(Span::styled("  ", theme.muted_style()));
        spans.push(Span::styled(error.clone(), Style::default().fg(theme.danger)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
