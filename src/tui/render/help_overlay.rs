use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const KEY_COLUMN: usize = 14;

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            (" \u{2191}\u{2193}/jk", "Move cursor up/down"),
            (" g/G", "Jump to top/bottom"),
            (" 1/2/3", "Show all / active / completed"),
            (" Tab/S-Tab", "Next/previous filter"),
        ],
    ),
    (
        "Tasks",
        &[
            (" a", "Add a task"),
            (" Space/x", "Toggle completed"),
            (" e/Enter", "Edit task text"),
            (" d", "Delete task (asks y/n)"),
        ],
    ),
    (
        "Editing",
        &[
            (" Enter", "Save"),
            (" Esc", "Cancel"),
            (" Ctrl+W", "Delete word"),
            (" Ctrl+U", "Clear line"),
        ],
    ),
    ("General", &[(" ?", "Toggle this help"), (" q", "Quit")]),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(" Key Bindings", header_style)),
        Line::from(""),
    ];
    for (section, bindings) in BINDINGS {
        lines.push(Line::from(Span::styled(format!(" {}", section), header_style)));
        lines.extend(bindings.iter().map(|&(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{:<width$}", key, width = KEY_COLUMN), key_style),
                Span::styled(desc, desc_style),
            ])
        }));
        lines.push(Line::from(""));
    }

    // Size to the content (plus border), clipped to the screen
    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
    let height = lines.len() as u16 + 2;
    let overlay_area = centered(width, height, area);

    frame.render_widget(Clear, overlay_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
