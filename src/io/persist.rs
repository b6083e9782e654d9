use std::collections::HashSet;
use std::path::PathBuf;

use crate::io::kv::{KeyValueStore, KvError};
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, RecoveryLog};
use crate::model::task::Task;

/// Why a stored payload was rejected
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate task id {0}")]
    DuplicateId(String),
    #[error("task {0} has empty text")]
    EmptyText(String),
}

/// Parse a stored payload into tasks, in stored order.
pub fn decode_tasks(payload: &str) -> Result<Vec<Task>, DecodeError> {
    let tasks: Vec<Task> = serde_json::from_str(payload)?;
    let mut seen = HashSet::new();
    for task in &tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(DecodeError::DuplicateId(task.id.clone()));
        }
        if task.text.trim().is_empty() {
            return Err(DecodeError::EmptyText(task.id.clone()));
        }
    }
    Ok(tasks)
}

/// Serialize tasks to the stored payload format.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tasks)
}

/// Why a save did not reach the slot
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] KvError),
}

/// Reads and writes the task collection in one key-value slot.
///
/// Never surfaces load problems: a missing slot is an empty list, a
/// malformed one is logged to the recovery log and treated as empty.
pub struct Persistence<S: KeyValueStore> {
    kv: S,
    slot: String,
    /// Where the recovery log lives; failures go to stderr when unset
    log_dir: Option<PathBuf>,
    /// Last payload this adapter wrote, to tell our writes from others'
    last_written: Option<String>,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(kv: S, slot: impl Into<String>) -> Self {
        Persistence {
            kv,
            slot: slot.into(),
            log_dir: None,
            last_written: None,
        }
    }

    /// Send load/save failures to the recovery log in `dir`
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    /// Load the stored collection.
    pub fn load(&mut self) -> Vec<Task> {
        let payload = match self.kv.get(&self.slot) {
            Ok(Some(p)) => p,
            Ok(None) => return Vec::new(),
            Err(e) => {
                self.report(
                    RecoveryEntry::now(RecoveryCategory::Parser, "could not read task store")
                        .field("Slot", self.slot.as_str())
                        .field("Error", e.to_string()),
                );
                return Vec::new();
            }
        };

        match decode_tasks(&payload) {
            Ok(tasks) => {
                self.last_written = Some(payload);
                tasks
            }
            Err(e) => {
                self.report(
                    RecoveryEntry::now(RecoveryCategory::Parser, "malformed task store discarded")
                        .field("Slot", self.slot.as_str())
                        .field("Error", e.to_string())
                        .body(payload),
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the slot with the full collection. Failures are logged,
    /// then returned for callers that want to tell the user; nothing retries.
    pub fn save(&mut self, tasks: &[Task]) -> Result<(), SaveError> {
        let payload = match encode_tasks(tasks) {
            Ok(payload) => payload,
            Err(e) => {
                self.report(
                    RecoveryEntry::now(RecoveryCategory::Write, "could not encode task store")
                        .field("Slot", self.slot.as_str())
                        .field("Error", e.to_string()),
                );
                return Err(e.into());
            }
        };
        match self.kv.set(&self.slot, &payload) {
            Ok(()) => {
                self.last_written = Some(payload);
                Ok(())
            }
            Err(e) => {
                self.report(
                    RecoveryEntry::now(RecoveryCategory::Write, "could not save task store")
                        .field("Slot", self.slot.as_str())
                        .field("Error", e.to_string())
                        .body(payload),
                );
                Err(e.into())
            }
        }
    }

    /// Whether the slot still holds exactly what this adapter last wrote or loaded
    pub fn is_unchanged_on_disk(&self) -> bool {
        match (self.kv.get(&self.slot), &self.last_written) {
            (Ok(Some(current)), Some(last)) => &current == last,
            (Ok(None), None) => true,
            _ => false,
        }
    }

    fn report(&self, entry: RecoveryEntry) {
        match &self.log_dir {
            Some(dir) => RecoveryLog::in_dir(dir).append(&entry),
            None => eprintln!("warning: {}", entry.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv::{FileKvStore, MemoryKvStore};
    use crate::model::list::TodoList;
    use crate::ops::list_ops::{add_task, toggle};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        let mut list = TodoList::default();
        add_task(&mut list, "write report");
        add_task(&mut list, "buy milk");
        let id = list.tasks[1].id.clone();
        toggle(&mut list, &id);
        list.tasks
    }

    #[test]
    fn missing_slot_loads_empty() {
        let mut p = Persistence::new(MemoryKvStore::new(), "todos");
        assert!(p.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trip() {
        let tasks = sample_tasks();
        let mut p = Persistence::new(MemoryKvStore::new(), "todos");
        p.save(&tasks).unwrap();
        assert_eq!(p.load(), tasks);
    }

    #[test]
    fn round_trip_through_files() {
        let tmp = TempDir::new().unwrap();
        let tasks = sample_tasks();
        let mut p = Persistence::new(FileKvStore::new(tmp.path()), "todos");
        p.save(&tasks).unwrap();

        let mut fresh = Persistence::new(FileKvStore::new(tmp.path()), "todos");
        assert_eq!(fresh.load(), tasks);
    }

    #[test]
    fn loads_browser_style_payload() {
        let payload = r#"[
            {"id":"1715678400000","text":"b","completed":false,
             "createdAt":"2024-05-14T09:20:00.000Z","isEditing":true},
            {"id":"1715678300000","text":"a","completed":true,
             "createdAt":"2024-05-14T09:18:20.123Z"}
        ]"#;
        let mut p = Persistence::new(MemoryKvStore::with_entry("todos", payload), "todos");
        let tasks = p.load();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "b");
        assert!(tasks[1].completed);
        assert_eq!(tasks[1].created_at.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn malformed_payload_loads_empty_and_logs() {
        let tmp = TempDir::new().unwrap();
        let mut p = Persistence::new(MemoryKvStore::with_entry("todos", "not json {{{"), "todos")
            .with_log_dir(tmp.path());
        assert!(p.load().is_empty());

        let entries = RecoveryLog::in_dir(tmp.path()).entries(None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[0].body, "not json {{{");
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert!(matches!(decode_tasks(r#"{"id":"1"}"#), Err(DecodeError::Json(_))));
        assert!(matches!(
            decode_tasks(r#"[{"id":"1","text":"a","completed":false,"createdAt":"yesterday"}]"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_malformed() {
        let payload = r#"[
            {"id":"1","text":"a","completed":false,"createdAt":"2024-05-14T09:20:00Z"},
            {"id":"1","text":"b","completed":false,"createdAt":"2024-05-14T09:21:00Z"}
        ]"#;
        assert!(matches!(decode_tasks(payload), Err(DecodeError::DuplicateId(id)) if id == "1"));
    }

    #[test]
    fn blank_text_is_malformed() {
        let payload =
            r#"[{"id":"1","text":"  ","completed":false,"createdAt":"2024-05-14T09:20:00Z"}]"#;
        assert!(matches!(decode_tasks(payload), Err(DecodeError::EmptyText(_))));
    }

    #[test]
    fn failed_save_logs_payload() {
        let tmp = TempDir::new().unwrap();
        let kv = MemoryKvStore::new().failing_writes();
        let mut p = Persistence::new(kv, "todos").with_log_dir(tmp.path());
        let tasks = sample_tasks();
        assert!(matches!(
            p.save(&tasks),
            Err(SaveError::Store(KvError::Unavailable))
        ));

        let entries = RecoveryLog::in_dir(tmp.path()).entries(None);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert_eq!(decode_tasks(&entries[0].body).unwrap(), tasks);
    }

    #[test]
    fn failed_save_keeps_previous_slot() {
        let payload = encode_tasks(&sample_tasks()).unwrap();
        let kv = MemoryKvStore::with_entry("todos", &payload).failing_writes();
        let mut p = Persistence::new(kv, "todos");
        assert!(p.save(&[]).is_err());
        assert_eq!(p.kv().get("todos").unwrap(), Some(payload));
    }

    #[test]
    fn detects_foreign_writes() {
        let mut p = Persistence::new(MemoryKvStore::new(), "todos");
        assert!(p.is_unchanged_on_disk());
        p.save(&sample_tasks()).unwrap();
        assert!(p.is_unchanged_on_disk());
        p.kv_mut().set("todos", "[]").unwrap();
        assert!(!p.is_unchanged_on_disk());
    }
}
