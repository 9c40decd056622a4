//! # Task Model
//!
//! The task record owned by the source-of-truth repository. The cache holds
//! a mirrored, possibly stale, copy keyed by `id`.
//!
//! Maps to the `tasks` table:
//! - `id`: caller-assigned, stable primary key (TEXT)
//! - `title` / `description`: display fields
//! - `status`: open string-valued category (e.g. `pending`, `done`)
//! - `priority`: integer ordering hint
//! - `created_at` / `updated_at`: TIMESTAMPTZ, RFC 3339 in JSON payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update to an existing task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
}

impl Task {
    /// Apply a partial update in place and bump `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "t-1".to_string(),
            title: "write report".to_string(),
            description: "quarterly numbers".to_string(),
            status: "pending".to_string(),
            priority: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn apply_overrides_only_provided_fields() {
        let mut task = sample();
        let before = task.clone();

        task.apply(TaskChanges {
            status: Some("done".to_string()),
            priority: Some(5),
            ..TaskChanges::default()
        });

        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.status, "done");
        assert_eq!(task.priority, 5);
        assert_eq!(task.created_at, before.created_at);
        assert!(task.updated_at >= before.updated_at);
    }

    #[test]
    fn json_round_trip_preserves_record() {
        let task = sample();
        let bytes = serde_json::to_vec(&task).unwrap();
        let decoded: Task = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, task);
    }
}
