use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, LineEditor};
use crate::util::unicode::{
    next_grapheme_boundary, prev_grapheme_boundary, word_boundary_left, word_boundary_right,
};

/// Keys for the single-line editor used by both Insert and Edit mode
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Enter => app.commit_editor(),
        KeyCode::Esc => app.cancel_editor(),

        KeyCode::Char('a') if ctrl => app.editor.cursor = 0,
        KeyCode::Char('e') if ctrl => app.editor.cursor = app.editor.buffer.len(),
        KeyCode::Char('u') if ctrl => app.editor.clear(),
        KeyCode::Char('w') if ctrl => delete_word_back(&mut app.editor),
        KeyCode::Char('b') if alt => move_word_left(&mut app.editor),
        KeyCode::Char('f') if alt => move_word_right(&mut app.editor),
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(c) => insert_char(&mut app.editor, c),

        KeyCode::Backspace if alt || ctrl => delete_word_back(&mut app.editor),
        KeyCode::Backspace => {
            let ed = &mut app.editor;
            if let Some(prev) = prev_grapheme_boundary(&ed.buffer, ed.cursor) {
                ed.buffer.replace_range(prev..ed.cursor, "");
                ed.cursor = prev;
            }
        }
        KeyCode::Delete => {
            let ed = &mut app.editor;
            if let Some(next) = next_grapheme_boundary(&ed.buffer, ed.cursor) {
                ed.buffer.replace_range(ed.cursor..next, "");
            }
        }

        KeyCode::Left if alt || ctrl => move_word_left(&mut app.editor),
        KeyCode::Right if alt || ctrl => move_word_right(&mut app.editor),
        KeyCode::Left => {
            let ed = &mut app.editor;
            if let Some(prev) = prev_grapheme_boundary(&ed.buffer, ed.cursor) {
                ed.cursor = prev;
            }
        }
        KeyCode::Right => {
            let ed = &mut app.editor;
            if let Some(next) = next_grapheme_boundary(&ed.buffer, ed.cursor) {
                ed.cursor = next;
            }
        }
        KeyCode::Home => app.editor.cursor = 0,
        KeyCode::End => app.editor.cursor = app.editor.buffer.len(),
        _ => {}
    }
}

fn insert_char(ed: &mut LineEditor, c: char) {
    // Single-line input: fold pasted newlines and tabs into spaces
    let c = if c.is_control() { ' ' } else { c };
    ed.buffer.insert(ed.cursor, c);
    ed.cursor += c.len_utf8();
}

fn move_word_left(ed: &mut LineEditor) {
    ed.cursor = word_boundary_left(&ed.buffer, ed.cursor);
}

fn move_word_right(ed: &mut LineEditor) {
    ed.cursor = word_boundary_right(&ed.buffer, ed.cursor);
}

fn delete_word_back(ed: &mut LineEditor) {
    let start = word_boundary_left(&ed.buffer, ed.cursor);
    ed.buffer.replace_range(start..ed.cursor, "");
    ed.cursor = start;
}
