use std::fmt;

use chrono::{DateTime, Utc};

use crate::model::list::TodoList;
use crate::model::task::{Filter, Task, TaskId};

/// Transient user feedback produced by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Added,
    Completed,
    Reactivated,
    Deleted,
    Updated,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Notice::Added => "Task added",
            Notice::Completed => "Task completed",
            Notice::Reactivated => "Task marked as active",
            Notice::Deleted => "Task deleted",
            Notice::Updated => "Task updated",
        };
        f.write_str(msg)
    }
}

/// What a command did to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// The task collection changed and must be re-saved
    pub changed: bool,
    pub notice: Option<Notice>,
}

impl Outcome {
    pub fn unchanged() -> Self {
        Outcome::default()
    }

    fn changed(notice: Notice) -> Self {
        Outcome {
            changed: true,
            notice: Some(notice),
        }
    }
}

/// A user action against the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Toggle(TaskId),
    SetCompleted(TaskId, bool),
    Delete(TaskId),
    StartEdit(TaskId),
    Edit(TaskId, String),
    CancelEdit(TaskId),
    SetFilter(Filter),
}

/// Apply a command. Unknown IDs and empty text are no-ops, never errors.
pub fn apply(list: &mut TodoList, command: Command) -> Outcome {
    match command {
        Command::Add(text) => add_task(list, &text),
        Command::Toggle(id) => toggle(list, &id),
        Command::SetCompleted(id, completed) => set_completed(list, &id, completed),
        Command::Delete(id) => delete(list, &id),
        Command::StartEdit(id) => start_edit(list, &id),
        Command::Edit(id, text) => edit(list, &id, &text),
        Command::CancelEdit(id) => cancel_edit(list, &id),
        Command::SetFilter(filter) => set_filter(list, filter),
    }
}

// ---------------------------------------------------------------------------
// Collection commands
// ---------------------------------------------------------------------------

/// Add a task with a fresh ID, stamped now.
pub fn add_task(list: &mut TodoList, text: &str) -> Outcome {
    add_task_with(list, text, Task::fresh_id(), Utc::now())
}

/// Add a task with an explicit ID and creation time. The task is prepended.
/// Empty or whitespace-only text, or an ID already in the list, is a no-op.
pub fn add_task_with(
    list: &mut TodoList,
    text: &str,
    id: TaskId,
    created_at: DateTime<Utc>,
) -> Outcome {
    let text = text.trim();
    if text.is_empty() || list.contains(&id) {
        return Outcome::unchanged();
    }
    list.tasks
        .insert(0, Task::new(id, text.to_string(), created_at));
    Outcome::changed(Notice::Added)
}

/// Flip completion on a task.
pub fn toggle(list: &mut TodoList, id: &str) -> Outcome {
    let Some(task) = list.find_mut(id) else {
        return Outcome::unchanged();
    };
    task.completed = !task.completed;
    Outcome::changed(completion_notice(task.completed))
}

/// Set completion explicitly. Already in that state → no-op.
pub fn set_completed(list: &mut TodoList, id: &str, completed: bool) -> Outcome {
    match list.find_mut(id) {
        Some(task) if task.completed != completed => {
            task.completed = completed;
            Outcome::changed(completion_notice(completed))
        }
        _ => Outcome::unchanged(),
    }
}

fn completion_notice(completed: bool) -> Notice {
    if completed {
        Notice::Completed
    } else {
        Notice::Reactivated
    }
}

/// Remove a task. Clears the edit selection if it pointed at this task.
pub fn delete(list: &mut TodoList, id: &str) -> Outcome {
    let Some(idx) = list.tasks.iter().position(|t| t.id == id) else {
        return Outcome::unchanged();
    };
    list.tasks.remove(idx);
    if list.is_editing(id) {
        list.editing = None;
    }
    Outcome::changed(Notice::Deleted)
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// Put a task into edit mode. Any other editing task leaves edit mode.
pub fn start_edit(list: &mut TodoList, id: &str) -> Outcome {
    if list.contains(id) {
        list.editing = Some(id.to_string());
    }
    Outcome::unchanged()
}

/// Commit an edit. Empty or whitespace-only text behaves as `cancel_edit`.
pub fn edit(list: &mut TodoList, id: &str, new_text: &str) -> Outcome {
    let new_text = new_text.trim();
    if new_text.is_empty() {
        return cancel_edit(list, id);
    }
    let Some(task) = list.find_mut(id) else {
        return Outcome::unchanged();
    };
    let changed = task.text != new_text;
    if changed {
        task.text = new_text.to_string();
    }
    if list.is_editing(id) {
        list.editing = None;
    }
    Outcome {
        changed,
        notice: Some(Notice::Updated),
    }
}

/// Leave edit mode without changing the task.
pub fn cancel_edit(list: &mut TodoList, id: &str) -> Outcome {
    if list.is_editing(id) {
        list.editing = None;
    }
    Outcome::unchanged()
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

pub fn set_filter(list: &mut TodoList, filter: Filter) -> Outcome {
    list.filter = filter;
    Outcome::unchanged()
}
