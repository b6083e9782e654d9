use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Task;
use crate::ops::view::{empty_message, progress_line};
use crate::tui::app::{App, Mode};
use crate::util::unicode;

use super::helpers::{check_symbol, push_right_aligned, split_at_cursor};

/// Render the task list: optional input line, task rows, and progress footer
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let mut height = area.height as usize;
    let mut lines: Vec<Line> = Vec::new();

    if app.mode == Mode::Insert {
        lines.push(input_line(app, width));
        height = height.saturating_sub(1);
    }

    let counts = app.counts();
    let footer = progress_line(&counts);
    // Footer takes the last row, with a blank line above it when space allows
    let list_height = match footer {
        Some(_) => height.saturating_sub(2).max(1),
        None => height,
    };

    let visible_len = app.visible_tasks().len();
    adjust_scroll(app, list_height, visible_len);

    if visible_len == 0 {
        let (title, hint) = empty_message(app.filter());
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", hint),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    } else {
        let tasks = app.visible_tasks();
        let editing = app.store.editing();
        for (idx, task) in tasks
            .iter()
            .enumerate()
            .skip(app.scroll_offset)
            .take(list_height)
        {
            let is_cursor = idx == app.cursor && app.mode != Mode::Insert;
            let is_editing = app.mode == Mode::Edit && editing == Some(task.id.as_str());
            lines.push(task_line(app, task, is_cursor, is_editing, width));
        }
    }

    if let Some(footer) = footer {
        let target = (area.height as usize).saturating_sub(1);
        while lines.len() < target {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!("  {}", footer),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Keep the cursor row inside the visible window
fn adjust_scroll(app: &mut App, list_height: usize, len: usize) {
    if list_height == 0 || len == 0 {
        app.scroll_offset = 0;
        return;
    }
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + list_height {
        app.scroll_offset = app.cursor + 1 - list_height;
    }
    app.scroll_offset = app.scroll_offset.min(len.saturating_sub(list_height));
}

fn input_line(app: &App, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let mut spans = vec![Span::styled(
        " + ",
        Style::default().fg(app.theme.highlight).bg(bg),
    )];
    push_editor_spans(app, &mut spans, bg);
    push_right_aligned(&mut spans, Span::raw(""), width, Style::default().bg(bg));
    Line::from(spans)
}

fn task_line(
    app: &App,
    task: &Task,
    is_cursor: bool,
    is_editing: bool,
    width: usize,
) -> Line<'static> {
    let row_bg = if is_cursor {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let bg_style = Style::default().bg(row_bg);
    let mut spans: Vec<Span<'static>> = Vec::new();

    let marker = if is_cursor { "\u{258E}" } else { " " };
    spans.push(Span::styled(
        marker,
        Style::default().fg(app.theme.highlight).bg(row_bg),
    ));
    spans.push(Span::styled(
        format!("{} ", check_symbol(task.completed)),
        Style::default()
            .fg(app.theme.check_color(task.completed))
            .bg(row_bg),
    ));

    let date = task.created_at.format("%Y-%m-%d").to_string();
    if is_editing {
        push_editor_spans(app, &mut spans, row_bg);
        push_right_aligned(&mut spans, Span::raw(""), width, bg_style);
    } else {
        // Leave room for the date column
        let text_budget = width.saturating_sub(6 + date.len() + 2);
        let text = unicode::truncate_to_width(&task.text, text_budget);
        let base = Style::default().bg(row_bg);
        let text_style = if task.completed {
            base.fg(app.theme.dim)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if is_cursor {
            base.fg(app.theme.text_bright)
        } else {
            base.fg(app.theme.text)
        };
        spans.push(Span::styled(text, text_style));
        push_right_aligned(
            &mut spans,
            Span::styled(
                format!("{} ", date),
                Style::default().fg(app.theme.dim).bg(row_bg),
            ),
            width,
            bg_style,
        );
    }
    Line::from(spans)
}

/// Editor buffer with a block cursor on the grapheme under it
fn push_editor_spans(app: &App, spans: &mut Vec<Span<'static>>, bg: ratatui::style::Color) {
    let (before, under, after) = split_at_cursor(&app.editor.buffer, app.editor.cursor);
    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);
    spans.push(Span::styled(before.to_string(), text_style));
    spans.push(Span::styled(
        under.to_string(),
        Style::default().fg(app.theme.background).bg(app.theme.highlight),
    ));
    spans.push(Span::styled(after.to_string(), text_style));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Filter;
    use crate::ops::list_ops::Command;
    use crate::tui::render::test_helpers::*;

    fn render_list(app: &mut App, h: u16) -> String {
        render_to_string(TERM_W, h, |frame, area| render_list_view(frame, app, area))
    }

    #[test]
    fn rows_newest_first_with_checkboxes() {
        let mut app = app_with_tasks(&["first", "second"]);
        let id = app.store.tasks()[1].id.clone();
        app.run_command(Command::Toggle(id));
        let out = render_list(&mut app, 10);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("[ ] second"), "{out}");
        assert!(lines[1].contains("[x] first"), "{out}");
        assert!(out.contains("1 of 2 tasks completed"));
    }

    #[test]
    fn empty_list_message() {
        let mut app = app_with_tasks(&[]);
        let out = render_list(&mut app, 10);
        assert!(out.contains("No tasks yet!"));
        assert!(out.contains("Add a new task to get started"));
        assert!(!out.contains("tasks completed"));
    }

    #[test]
    fn empty_filter_message() {
        let mut app = app_with_tasks(&["a"]);
        app.set_filter(Filter::Completed);
        let out = render_list(&mut app, 10);
        assert!(out.contains("No completed tasks!"), "{out}");
        assert!(out.contains("0 of 1 tasks completed"));
    }

    #[test]
    fn insert_line_shows_buffer() {
        let mut app = app_with_tasks(&["a"]);
        app.begin_insert();
        app.editor = crate::tui::app::LineEditor::with_text("new thing");
        let out = render_list(&mut app, 10);
        assert!(out.lines().next().unwrap().contains("+ new thing"), "{out}");
    }

    #[test]
    fn editing_row_shows_editor_buffer() {
        let mut app = app_with_tasks(&["old text"]);
        app.begin_edit();
        app.editor = crate::tui::app::LineEditor::with_text("new text");
        let out = render_list(&mut app, 10);
        assert!(out.contains("[ ] new text"), "{out}");
        assert!(!out.contains("old text"));
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let names: Vec<String> = (0..20).map(|i| format!("task {i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut app = app_with_tasks(&refs);
        // Newest first: "task 19" is on top; move to the oldest
        app.cursor = 19;
        let out = render_list(&mut app, 8);
        assert!(out.contains("task 00"), "{out}");
        assert!(!out.contains("task 19"));
        assert!(app.scroll_offset > 0);
        assert!(out.contains("0 of 20 tasks completed"));
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "x".repeat(200);
        let mut app = app_with_tasks(&[long.as_str()]);
        let out = render_list(&mut app, 5);
        assert!(out.contains('\u{2026}'));
    }
}
