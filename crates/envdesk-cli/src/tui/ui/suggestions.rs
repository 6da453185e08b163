//! Suggestions tab: the current batch with the selected item highlighted.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::colors::suggestion_color;
use super::theme::BORDER_TYPE;
use crate::tui::app::App;

pub(super) fn draw_suggestions(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let title = match &app.suggestions {
        Some(batch) => format!(
            " Suggestions ({}, {:02}:{:02} UTC) ",
            batch.source,
            batch.generated_at.hour(),
            batch.generated_at.minute()
        ),
        None => " Suggestions ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(theme.border_active_style());

    let suggestions = app.suggestion_list();
    if suggestions.is_empty() {
        let message = if app.generating || app.suggestions.is_none() {
            "Waiting for suggestions..."
        } else {
            "Nothing to suggest right now"
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(theme.text_muted))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = suggestions
        .iter()
        .map(|s| {
            let color = suggestion_color(s.category, &theme);
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    format!("[{}] ", s.category.as_str().to_ascii_uppercase()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(s.message.clone(), Style::default().fg(theme.text_primary)),
            ])];
            if let Some(action) = &s.action {
                lines.push(Line::from(vec![
                    Span::styled("    -> ", Style::default().fg(theme.text_muted)),
                    Span::styled(action.label.clone(), Style::default().fg(theme.primary)),
                    Span::styled(
                        format!(" ({} {})", action.command, s.parameter),
                        Style::default().fg(theme.text_muted),
                    ),
                ]));
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style());
    let mut state = ListState::default().with_selected(Some(app.selected_suggestion));
    frame.render_stateful_widget(list, area, &mut state);
}
