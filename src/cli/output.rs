use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::task::{Filter, Task};
use crate::ops::view::{self, Counts};

/// Characters of the ID shown in text output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub filter: Filter,
    pub tasks: Vec<&'a Task>,
    pub counts: Counts,
}

#[derive(Serialize)]
pub struct CommandResultJson<'a> {
    /// False when the command was a no-op
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<&'a Task>,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// One line per task: `[x] 3f2a9c1d  text`
pub fn format_task_line(task: &Task) -> String {
    format!(
        "[{}] {}  {}",
        if task.completed { 'x' } else { ' ' },
        short_id(&task.id),
        task.text
    )
}

/// Full listing: task lines, or the empty message, then the progress footer.
pub fn format_task_list(tasks: &[&Task], filter: Filter, counts: &Counts) -> String {
    let mut out = String::new();
    if tasks.is_empty() {
        let (headline, hint) = view::empty_message(filter);
        out.push_str(&format!("{}\n{}\n", headline, hint));
    } else {
        for task in tasks {
            out.push_str(&format_task_line(task));
            out.push('\n');
        }
    }
    if let Some(progress) = view::progress_line(counts) {
        out.push('\n');
        out.push_str(&progress);
        out.push('\n');
    }
    out
}

/// `All (3)  Active (2)  Completed (1)`
pub fn format_counts(counts: &Counts) -> String {
    Filter::ALL
        .iter()
        .map(|f| format!("{} ({})", f.label(), counts.for_filter(*f)))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn format_recovery_entries(entries: &[RecoveryEntry]) -> String {
    if entries.is_empty() {
        return "recovery log is empty\n".to_string();
    }
    entries
        .iter()
        .map(RecoveryEntry::to_markdown)
        .collect::<Vec<_>>()
        .join("\n")
}
