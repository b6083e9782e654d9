use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::kv::{KeyValueStore, MemoryKvStore};
use crate::io::persist::Persistence;
use crate::io::store::DynTaskStore;
use crate::model::Config;
use crate::ops::list_ops::Command;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

fn app_with_kv(kv: MemoryKvStore) -> App {
    let kv: Box<dyn KeyValueStore> = Box::new(kv);
    let store = DynTaskStore::open(Persistence::new(kv, "todos"));
    App::new(store, &Config::default())
}

/// Build an App over an in-memory store, adding `texts` in order.
/// The last text is the newest and so sits at the top of the list.
pub fn app_with_tasks(texts: &[&str]) -> App {
    let mut app = app_with_kv(MemoryKvStore::new());
    for text in texts {
        app.store.dispatch(Command::Add(text.to_string()));
    }
    app
}

/// Build an App whose every save fails.
pub fn app_with_failing_store() -> App {
    app_with_kv(MemoryKvStore::new().failing_writes())
}
