use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::list_ops::Command;
use crate::tui::app::{App, Mode};

/// y deletes the pending task; anything else backs out
pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    let Mode::ConfirmDelete(id) = std::mem::replace(&mut app.mode, Mode::Navigate) else {
        return;
    };
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.run_command(Command::Delete(id));
        }
        _ => {
            app.status_message = None;
        }
    }
}
