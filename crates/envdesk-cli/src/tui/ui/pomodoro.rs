//! Pomodoro tab: phase, countdown, progress and session count.

use envdesk_core::PomodoroStatus;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use super::colors::phase_color;
use super::theme::BORDER_TYPE;
use crate::tui::app::App;

pub(super) fn draw_pomodoro(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();
    let pomodoro = &app.pomodoro;
    let status = pomodoro.status();
    let color = phase_color(status, &theme);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(Style::default().fg(color))
        .title(" Focus Timer ")
        .title_style(theme.title_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // Phase
            Constraint::Length(1),
            Constraint::Length(1), // Countdown
            Constraint::Length(1),
            Constraint::Length(1), // Progress
            Constraint::Length(1),
            Constraint::Length(1), // Sessions
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(inner);

    let paused = status != PomodoroStatus::Idle && !pomodoro.is_running();
    let state_label = if paused { " (paused)" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                status.title(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(state_label, theme.muted_style()),
        ]))
        .alignment(Alignment::Center),
        layout[1],
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            pomodoro.format_time_left(),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        layout[3],
    );

    let gauge_area = centered_width(layout[5], 50);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(theme.bg_selected))
            .ratio(pomodoro.progress())
            .label(format!("{:.0}%", pomodoro.progress() * 100.0)),
        gauge_area,
    );

    let settings = pomodoro.settings();
    let sessions = format!(
        "Session {} | {} completed | long break every {}",
        pomodoro.display_session().max(1),
        pomodoro.state().session_count,
        settings.sessions_before_long_break
    );
    frame.render_widget(
        Paragraph::new(Span::styled(sessions, Style::default().fg(theme.text_secondary)))
            .alignment(Alignment::Center),
        layout[7],
    );

    let hint = if status == PomodoroStatus::Idle {
        format!("Press space to start a {} minute focus session", settings.work_duration)
    } else {
        "space pause/resume | n skip | x reset".to_string()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, theme.muted_style())).alignment(Alignment::Center),
        layout[8],
    );
}

/// Horizontally center a region `percent` wide.
fn centered_width(area: Rect, percent: u16) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent) / 2),
            Constraint::Percentage(percent),
            Constraint::Percentage((100 - percent) / 2),
        ])
        .split(area)[1]
}
