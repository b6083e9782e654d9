use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Filter;
use crate::tui::app::App;

use super::helpers::spans_width;

/// Render the filter tabs with a separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    // Leading icon
    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.purple).bg(bg),
    ));
    spans.push(Span::styled(" ", Style::default().bg(bg)));

    let counts = app.counts();
    for filter in Filter::ALL {
        let is_current = app.filter() == filter;
        spans.push(Span::styled(
            format!(" {} ({}) ", filter.label(), counts.for_filter(filter)),
            tab_style(app, is_current),
        ));
        sep_cols.push(spans_width(&spans));
        spans.push(sep.clone());
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let mut line: String = String::with_capacity(width * 3);
    for col in 0..width {
        if sep_cols.contains(&col) {
            line.push('\u{2534}');
        } else {
            line.push('\u{2500}');
        }
    }
    let sep_widget =
        Paragraph::new(line).style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::list_ops::Command;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tabs_show_counts() {
        let mut app = app_with_tasks(&["a", "b", "c"]);
        let id = app.selected_id().unwrap();
        app.run_command(Command::Toggle(id));
        let out = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let first = out.lines().next().unwrap();
        assert!(first.contains("All (3)"), "{first}");
        assert!(first.contains("Active (2)"));
        assert!(first.contains("Completed (1)"));
        assert!(out.lines().nth(1).unwrap().contains('\u{2534}'));
    }

    #[test]
    fn current_tab_is_highlighted() {
        let mut app = app_with_tasks(&[]);
        app.set_filter(Filter::Active);
        let backend = ratatui::backend::TestBackend::new(TERM_W, 2);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_tab_bar(frame, &app, frame.area()))
            .unwrap();
        let buf = terminal.backend().buffer();
        let row: Vec<String> = (0..TERM_W).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        let col_of = |word: &str| {
            let first = word.chars().next().unwrap().to_string();
            (0..row.len())
                .find(|&i| row[i] == first && row[i..i + word.len()].concat() == word)
                .unwrap() as u16
        };
        let col = col_of("Active");
        assert_eq!(buf[(col, 0)].bg, app.theme.selection_bg);
        let all_col = col_of("All");
        assert_eq!(buf[(all_col, 0)].bg, app.theme.background);
    }
}
