use super::task::{Filter, Task, TaskId};

/// The whole task list state: the collection, the filter selection, and
/// which task (if any) is being edited.
///
/// Mutated only through `ops::list_ops`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList {
    /// Newest first
    pub tasks: Vec<Task>,
    pub filter: Filter,
    /// The single task in edit mode
    pub editing: Option<TaskId>,
}

impl TodoList {
    /// A list with the given tasks, default filter, nothing editing
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        TodoList {
            tasks,
            ..Default::default()
        }
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.as_deref() == Some(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
