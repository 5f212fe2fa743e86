//! Task domain service

use bson::ser::serialize_to_document;
use mongodb::Database;

use crate::auth::context::RequestContext;
use crate::error::AppResult;
use crate::models::task::{Task, TaskStatus};

use super::{BaseService, UpdateOptions};

/// Partial task update
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TaskEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone)]
pub struct TaskService {
    base: BaseService<Task>,
}

impl TaskService {
    pub fn new(db: &Database, ownership_field: Option<String>) -> Self {
        Self {
            base: BaseService::new(db, ownership_field),
        }
    }

    /// The underlying generic service, for plain CRUD calls
    pub fn base(&self) -> &BaseService<Task> {
        &self.base
    }

    /// Creates a task owned by the caller; initial status is `to_do`
    pub async fn create(
        &self,
        summary: String,
        description: Option<String>,
        ctx: &RequestContext,
    ) -> AppResult<Task> {
        let task = Task::new(summary, description, ctx.user_id_str().to_string());
        self.base.save(&task).await
    }

    /// Applies a task edit with audit stamping
    pub async fn edit(&self, id: &str, data: TaskEdit, ctx: &RequestContext) -> AppResult<Task> {
        let mut changes = serialize_to_document(&data)?;
        changes.insert("updated_at", bson::DateTime::now());
        changes.insert("updated_by", ctx.user_id_str());

        self.base
            .update_by_id(
                id,
                changes,
                UpdateOptions {
                    ctx: Some(ctx),
                    ..Default::default()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_edit_serializes_status_variant() {
        let edit = TaskEdit {
            summary: None,
            description: None,
            status: Some(TaskStatus::Done),
        };
        let document = serialize_to_document(&edit).unwrap();
        assert_eq!(document.get_str("status").unwrap(), "done");
        assert!(!document.contains_key("summary"));
    }
}
