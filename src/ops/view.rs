//! Read-only projections of a `TodoList` for presentation.
//!
//! Everything here is recomputed on each call; lists are small enough that
//! caching would only add invalidation bugs.

use serde::Serialize;

use crate::model::list::TodoList;
use crate::model::task::{Filter, Task};

/// Task totals per filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    /// Count for a given filter tab
    pub fn for_filter(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Active => self.active,
            Filter::Completed => self.completed,
        }
    }
}

/// Tasks visible under the list's current filter, in collection order
pub fn filtered_tasks(list: &TodoList) -> Vec<&Task> {
    tasks_matching(list, list.filter)
}

/// Tasks visible under an arbitrary filter, in collection order
pub fn tasks_matching(list: &TodoList, filter: Filter) -> Vec<&Task> {
    list.tasks.iter().filter(|t| filter.matches(t)).collect()
}

pub fn counts(list: &TodoList) -> Counts {
    let completed = list.tasks.iter().filter(|t| t.completed).count();
    Counts {
        all: list.tasks.len(),
        active: list.tasks.len() - completed,
        completed,
    }
}

/// Footer line like `1 of 3 tasks completed`. None for an empty list.
pub fn progress_line(counts: &Counts) -> Option<String> {
    if counts.all == 0 {
        return None;
    }
    Some(format!(
        "{} of {} tasks completed",
        counts.completed, counts.all
    ))
}

/// Headline and hint shown when nothing matches the filter
pub fn empty_message(filter: Filter) -> (String, String) {
    match filter {
        Filter::All => (
            "No tasks yet!".to_string(),
            "Add a new task to get started".to_string(),
        ),
        other => (
            format!("No {} tasks!", other.as_str()),
            "Switch to \"All\" to see your other tasks".to_string(),
        ),
    }
}
