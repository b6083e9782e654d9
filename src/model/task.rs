use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque task identifier (32 lowercase hex chars for generated IDs)
pub type TaskId = String;

/// A single to-do item.
///
/// This is also the persisted record: `{id, text, completed, createdAt}`.
/// Unknown fields (e.g. a stale `isEditing`) are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Display text, always trimmed and non-empty
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new, not-yet-completed task
    pub fn new(id: TaskId, text: String, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            text,
            completed: false,
            created_at,
        }
    }

    /// Generate a fresh task ID
    pub fn fresh_id() -> TaskId {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// View selector over the task collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// All filters in tab order
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// Whether a task is visible under this filter
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// Capitalized label for tabs
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Next filter in tab order (wraps)
    pub fn next(self) -> Filter {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    /// Previous filter in tab order (wraps)
    pub fn prev(self) -> Filter {
        match self {
            Filter::All => Filter::Completed,
            Filter::Active => Filter::All,
            Filter::Completed => Filter::Active,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected all, active, or completed)")]
pub struct ParseFilterError(pub String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::new(
            "abc".into(),
            "buy milk".into(),
            Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn serializes_with_camel_case_created_at() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"abc","text":"buy milk","completed":false,"createdAt":"2025-05-14T09:30:00Z"}"#
        );
    }

    #[test]
    fn deserialize_ignores_is_editing() {
        let json = r#"{"id":"abc","text":"buy milk","completed":true,
            "createdAt":"2025-05-14T09:30:00.000Z","isEditing":true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.completed);
        assert_eq!(task.created_at, sample().created_at);
    }

    #[test]
    fn fresh_ids_are_distinct_hex() {
        let a = Task::fresh_id();
        let b = Task::fresh_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn filter_matches() {
        let mut task = sample();
        assert!(Filter::All.matches(&task));
        assert!(Filter::Active.matches(&task));
        assert!(!Filter::Completed.matches(&task));
        task.completed = true;
        assert!(!Filter::Active.matches(&task));
        assert!(Filter::Completed.matches(&task));
    }

    #[test]
    fn filter_parse_and_cycle() {
        assert_eq!("active".parse::<Filter>(), Ok(Filter::Active));
        assert!("Active".parse::<Filter>().is_err());
        assert!("done".parse::<Filter>().is_err());
        for f in Filter::ALL {
            assert_eq!(f.next().prev(), f);
            assert_eq!(f.as_str().parse::<Filter>(), Ok(f));
        }
    }
}
