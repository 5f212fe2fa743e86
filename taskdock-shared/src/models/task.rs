//! Task model
//!
//! # State Machine
//!
//! ```text
//! to_do → in_progress → done
//! ```
//!
//! Tasks are owned by the user who created them: `created_by` is the
//! ownership field, so non-admin callers only ever see their own tasks.

use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::Model;

/// Task progress state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to_do",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// A persisted task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: TaskStatus,

    pub created_at: DateTime,

    /// Owning user's identifier
    pub created_by: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Task {
    /// Builds a new task for the given owner; initial status is `to_do`
    pub fn new(summary: String, description: Option<String>, created_by: String) -> Self {
        Self {
            id: None,
            summary,
            description,
            status: TaskStatus::ToDo,
            created_at: DateTime::now(),
            created_by,
            updated_at: None,
            updated_by: None,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl Model for Task {
    const COLLECTION: &'static str = "tasks";
    const RESOURCE: &'static str = "tasks";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskStatus::ToDo.as_str(), "to_do");
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("write report".to_string(), None, "owner-id".to_string());
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.created_by, "owner-id");
        assert!(task.id.is_none());
        assert!(task.deleted_at.is_none());
    }

    #[test]
    fn test_bson_roundtrip() {
        let task = Task::new(
            "write report".to_string(),
            Some("for q3".to_string()),
            "owner-id".to_string(),
        );

        let document = bson::ser::serialize_to_document(&task).expect("Should serialize");
        assert_eq!(document.get_str("status").unwrap(), "to_do");

        let back: Task =
            bson::de::deserialize_from_document(document).expect("Should deserialize");
        assert_eq!(back.summary, "write report");
        assert_eq!(back.status, TaskStatus::ToDo);
    }
}
