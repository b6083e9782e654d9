use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::Filter;
use crate::ops::list_ops::Command;
use crate::tui::app::{App, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay swallows everything except its close keys
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    // Clear any transient status message on keypress
    app.status_message = None;
    app.status_is_error = false;

    match (key.modifiers, key.code) {
        (m, KeyCode::Char('c')) if m.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (_, KeyCode::Char('?')) => app.show_help = true,

        // Movement
        (_, KeyCode::Char('j') | KeyCode::Down) => move_cursor(app, 1),
        (_, KeyCode::Char('k') | KeyCode::Up) => move_cursor(app, -1),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.cursor = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => {
            app.cursor = app.visible_tasks().len().saturating_sub(1);
        }

        // Filters
        (_, KeyCode::Char('1')) => app.set_filter(Filter::All),
        (_, KeyCode::Char('2')) => app.set_filter(Filter::Active),
        (_, KeyCode::Char('3')) => app.set_filter(Filter::Completed),
        (_, KeyCode::Tab | KeyCode::Right | KeyCode::Char('l')) => {
            app.set_filter(app.filter().next())
        }
        (_, KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h')) => {
            app.set_filter(app.filter().prev())
        }

        // Task commands
        (_, KeyCode::Char('a') | KeyCode::Char('o')) => app.begin_insert(),
        (_, KeyCode::Char(' ') | KeyCode::Char('x')) => {
            if let Some(id) = app.selected_id() {
                app.run_command(Command::Toggle(id.clone()));
                app.focus_task(&id);
            }
        }
        (_, KeyCode::Char('e') | KeyCode::Enter) => app.begin_edit(),
        (_, KeyCode::Char('d') | KeyCode::Delete) => {
            if let Some(id) = app.selected_id() {
                app.mode = Mode::ConfirmDelete(id);
            }
        }
        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.visible_tasks().len();
    if len == 0 {
        app.cursor = 0;
        return;
    }
    app.cursor = app.cursor.saturating_add_signed(delta).min(len - 1);
}
