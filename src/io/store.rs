use std::path::Path;

use crate::io::kv::{FileKvStore, KeyValueStore};
use crate::io::persist::Persistence;
use crate::model::config::Config;
use crate::model::list::TodoList;
use crate::model::task::{Filter, Task, TaskId};
use crate::ops::list_ops::{self, Command, Outcome};
use crate::ops::view::{self, Counts};

/// Error resolving a user-typed task ID prefix
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task id '{0}' is ambiguous ({1} matches)")]
    Ambiguous(String, usize),
}

/// The authoritative task list plus write-through persistence.
///
/// Every command that changes the collection is saved before `dispatch`
/// returns. Filter and edit-mode changes are never written.
pub struct TaskStore<S: KeyValueStore> {
    list: TodoList,
    persistence: Persistence<S>,
    /// Message from the most recent failed save, cleared by the next success
    save_error: Option<String>,
}

/// The store used by the binaries: one JSON file per slot in the data dir
pub type FileTaskStore = TaskStore<FileKvStore>;

/// Backend chosen at runtime (file-backed in the TUI, in-memory in its tests)
pub type DynTaskStore = TaskStore<Box<dyn KeyValueStore>>;

impl FileTaskStore {
    /// Open the configured slot in `data_dir`, logging failures to its recovery log.
    pub fn open_in(data_dir: &Path, config: &Config) -> Self {
        let persistence = Persistence::new(FileKvStore::new(data_dir), config.store.slot.clone())
            .with_log_dir(data_dir);
        TaskStore::open(persistence)
    }

    /// Path of the slot file backing this store
    pub fn slot_path(&self) -> std::path::PathBuf {
        let kv = self.persistence.kv();
        kv.path_for(self.persistence.slot())
    }
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load saved tasks. The filter starts at `all` and nothing is editing.
    pub fn open(mut persistence: Persistence<S>) -> Self {
        let tasks = persistence.load();
        TaskStore {
            list: TodoList::from_tasks(tasks),
            persistence,
            save_error: None,
        }
    }

    /// Run a command; re-save the whole collection if it changed.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = list_ops::apply(&mut self.list, command);
        if outcome.changed {
            match self.persistence.save(&self.list.tasks) {
                Ok(()) => self.save_error = None,
                Err(e) => self.save_error = Some(e.to_string()),
            }
        }
        outcome
    }

    /// Replace in-memory tasks with what is on disk, keeping the filter.
    /// The edit selection survives only if its task still exists.
    pub fn reload(&mut self) {
        let tasks = self.persistence.load();
        self.list.tasks = tasks;
        if let Some(id) = &self.list.editing
            && !self.list.contains(id)
        {
            self.list.editing = None;
        }
    }

    /// True when someone other than this store has changed the slot
    pub fn changed_externally(&self) -> bool {
        !self.persistence.is_unchanged_on_disk()
    }

    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn tasks(&self) -> &[Task] {
        &self.list.tasks
    }

    pub fn filter(&self) -> Filter {
        self.list.filter
    }

    pub fn editing(&self) -> Option<&str> {
        self.list.editing.as_deref()
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        view::filtered_tasks(&self.list)
    }

    pub fn counts(&self) -> Counts {
        view::counts(&self.list)
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Resolve a full ID or unique ID prefix to a task ID.
    pub fn resolve_id(&self, prefix: &str) -> Result<TaskId, ResolveError> {
        if let Some(task) = self.list.find(prefix) {
            return Ok(task.id.clone());
        }
        let matches: Vec<&Task> = if prefix.is_empty() {
            Vec::new()
        } else {
            self.list
                .tasks
                .iter()
                .filter(|t| t.id.starts_with(prefix))
                .collect()
        };
        match matches.as_slice() {
            [] => Err(ResolveError::NotFound(prefix.to_string())),
            [task] => Ok(task.id.clone()),
            many => Err(ResolveError::Ambiguous(prefix.to_string(), many.len())),
        }
    }
}
