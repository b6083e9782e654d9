use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io::read_config;
use crate::io::kv::{FileKvStore, KeyValueStore};
use crate::io::persist::Persistence;
use crate::io::store::DynTaskStore;
use crate::io::watcher::SlotWatcher;
use crate::model::{Config, Filter, Task, TaskId};
use crate::ops::list_ops::{Command, Outcome};
use crate::ops::view::Counts;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a new task into the input line
    Insert,
    /// Editing the text of the store's editing task
    Edit,
    /// Waiting for y/n before deleting this task
    ConfirmDelete(TaskId),
}

/// Single-line text buffer with a byte-offset cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    pub buffer: String,
    /// Byte offset, always on a grapheme boundary
    pub cursor: usize,
}

impl LineEditor {
    /// Editor holding `text` with the cursor at the end
    pub fn with_text(text: &str) -> Self {
        LineEditor {
            buffer: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the buffer contents, leaving the editor empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }
}

/// Main application state
pub struct App {
    pub store: DynTaskStore,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Cursor index into the filtered task list
    pub cursor: usize,
    /// First visible row of the task list
    pub scroll_offset: usize,
    pub editor: LineEditor,
    /// Help overlay visible
    pub show_help: bool,
    pub show_key_hints: bool,
    /// Transient message for the status row
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

impl App {
    pub fn new(store: DynTaskStore, config: &Config) -> Self {
        App {
            store,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            cursor: 0,
            scroll_offset: 0,
            editor: LineEditor::default(),
            show_help: false,
            show_key_hints: config.ui.show_key_hints,
            status_message: None,
            status_is_error: false,
        }
    }

    /// Tasks under the current filter, in display order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.store.filtered_tasks()
    }

    pub fn counts(&self) -> Counts {
        self.store.counts()
    }

    pub fn filter(&self) -> Filter {
        self.store.filter()
    }

    /// Task under the cursor
    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.cursor).copied()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Keep the cursor on a visible row
    pub fn clamp_cursor(&mut self) {
        let len = self.visible_tasks().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Move the cursor to the task with this ID if it is visible
    pub fn focus_task(&mut self, id: &str) {
        if let Some(idx) = self.visible_tasks().iter().position(|t| t.id == id) {
            self.cursor = idx;
        } else {
            self.clamp_cursor();
        }
    }

    /// Run a command through the store and surface its notice or save error.
    pub fn run_command(&mut self, command: Command) -> Outcome {
        let outcome = self.store.dispatch(command);
        if outcome.changed
            && let Some(err) = self.store.save_error()
        {
            self.status_message = Some(format!("not saved: {}", err));
            self.status_is_error = true;
        } else if let Some(notice) = outcome.notice {
            self.status_message = Some(notice.to_string());
            self.status_is_error = false;
        }
        self.clamp_cursor();
        outcome
    }

    pub fn set_filter(&mut self, filter: Filter) {
        let selected = self.selected_id();
        self.run_command(Command::SetFilter(filter));
        match selected {
            Some(id) => self.focus_task(&id),
            None => self.cursor = 0,
        }
    }

    // -----------------------------------------------------------------------
    // Insert / edit flows
    // -----------------------------------------------------------------------

    pub fn begin_insert(&mut self) {
        self.editor.clear();
        self.mode = Mode::Insert;
    }

    /// Start editing the selected task. No-op on an empty list.
    pub fn begin_edit(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, text) = (task.id.clone(), task.text.clone());
        self.run_command(Command::StartEdit(id));
        self.editor = LineEditor::with_text(&text);
        self.mode = Mode::Edit;
    }

    /// Enter in Insert/Edit mode.
    pub fn commit_editor(&mut self) {
        match self.mode {
            Mode::Insert => {
                let text = self.editor.take();
                let outcome = self.run_command(Command::Add(text));
                if outcome.changed
                    && let Some(id) = self.store.tasks().first().map(|t| t.id.clone())
                {
                    self.focus_task(&id);
                }
            }
            Mode::Edit => {
                let text = self.editor.take();
                if let Some(id) = self.store.editing().map(str::to_string) {
                    self.run_command(Command::Edit(id.clone(), text));
                    self.focus_task(&id);
                }
            }
            _ => {}
        }
        self.mode = Mode::Navigate;
    }

    /// Esc in Insert/Edit mode: drop the buffer.
    pub fn cancel_editor(&mut self) {
        if self.mode == Mode::Edit
            && let Some(id) = self.store.editing().map(str::to_string)
        {
            self.run_command(Command::CancelEdit(id));
        }
        self.editor.clear();
        self.mode = Mode::Navigate;
    }

    // -----------------------------------------------------------------------
    // External changes
    // -----------------------------------------------------------------------

    /// Reload if another process rewrote the slot. An open edit whose task
    /// disappeared is abandoned.
    pub fn reload_if_changed(&mut self) {
        if !self.store.changed_externally() {
            return;
        }
        let selected = self.selected_id();
        self.store.reload();
        if self.mode == Mode::Edit && self.store.editing().is_none() {
            self.editor.clear();
            self.mode = Mode::Navigate;
        }
        if let Mode::ConfirmDelete(id) = &self.mode
            && !self.store.list().contains(id)
        {
            self.mode = Mode::Navigate;
        }
        match selected {
            Some(id) => self.focus_task(&id),
            None => self.clamp_cursor(),
        }
        self.status_message = Some("reloaded: tasks changed on disk".to_string());
        self.status_is_error = false;
    }
}

/// Open the configured slot in `data_dir` with a boxed file backend.
pub fn open_store(data_dir: &Path, config: &Config) -> DynTaskStore {
    let kv: Box<dyn KeyValueStore> = Box::new(FileKvStore::new(data_dir));
    let persistence = Persistence::new(kv, config.store.slot.clone()).with_log_dir(data_dir);
    DynTaskStore::open(persistence)
}

/// Run the TUI application
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = read_config(data_dir)?;
    std::fs::create_dir_all(data_dir)?;
    let store = open_store(data_dir, &config);
    let slot_path = FileKvStore::new(data_dir).path_for(&config.store.slot);
    let mut app = App::new(store, &config);

    // Watching is best-effort; without it external edits show up on restart
    let watcher = SlotWatcher::start(&slot_path).ok();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&SlotWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(w) = watcher
            && w.poll()
        {
            app.reload_if_changed();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
