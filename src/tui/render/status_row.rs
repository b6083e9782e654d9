use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};

use super::helpers::push_right_aligned;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let bg_style = Style::default().bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let mut spans: Vec<Span> = Vec::new();
    let hint = match &app.mode {
        Mode::Navigate => {
            if let Some(msg) = &app.status_message {
                let fg = if app.status_is_error {
                    app.theme.red
                } else {
                    app.theme.green
                };
                spans.push(Span::styled(msg.clone(), Style::default().fg(fg).bg(bg)));
            }
            "a add  space toggle  e edit  d delete  ? help"
        }
        Mode::Insert => {
            spans.push(Span::styled(
                "-- NEW TASK --",
                Style::default().fg(app.theme.highlight).bg(bg),
            ));
            "Enter add  Esc cancel"
        }
        Mode::Edit => {
            spans.push(Span::styled(
                "-- EDIT --",
                Style::default().fg(app.theme.highlight).bg(bg),
            ));
            "Enter save  Esc cancel"
        }
        Mode::ConfirmDelete(_) => {
            spans.push(Span::styled(
                "delete task? y/n",
                Style::default().fg(app.theme.red).bg(bg),
            ));
            ""
        }
    };

    if app.show_key_hints && !hint.is_empty() {
        push_right_aligned(&mut spans, Span::styled(hint, dim), width, bg_style);
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(paragraph, area);
}
