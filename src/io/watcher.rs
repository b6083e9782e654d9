use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Signals from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum FileEvent {
    /// The slot file was created, modified, or removed.
    SlotChanged,
}

/// Watches the data directory for changes to one slot file.
///
/// The callback runs on notify's thread and only forwards a signal; the
/// store itself is reloaded by whoever calls `poll()`.
pub struct SlotWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl SlotWatcher {
    /// Start watching `slot_path` (its parent directory must exist).
    pub fn start(slot_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target: PathBuf = slot_path.to_path_buf();
        let dir = slot_path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                // Atomic writes land as a rename onto the target path
                if event.paths.iter().any(|p| p == &target) {
                    let _ = tx.send(FileEvent::SlotChanged);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(SlotWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll. True if the slot changed since the last poll.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while let Ok(FileEvent::SlotChanged) = self.rx.try_recv() {
            changed = true;
        }
        changed
    }
}
