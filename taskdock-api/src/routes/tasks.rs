//! Task endpoints
//!
//! All task routes sit behind the authentication gate. Non-admin callers are
//! ownership-scoped: their listings and lookups only ever reach tasks they
//! created, while admins see everything.
//!
//! # Endpoints
//!
//! - `GET /v1/tasks` — paginated listing, searchable over `summary`
//! - `GET /v1/tasks/:id`
//! - `POST /v1/tasks` — create, status starts as `to_do`
//! - `PUT /v1/tasks/:id`
//! - `DELETE /v1/tasks/:id` — soft delete, 204 on success

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskdock_shared::auth::context::RequestContext;
use taskdock_shared::db::crud::document_to_json;
use taskdock_shared::error::AppError;
use taskdock_shared::models::task::{Task, TaskStatus};
use taskdock_shared::service::tasks::TaskEdit;

use crate::app::AppState;
use crate::error::ApiResult;
use crate::routes::{FieldsParam, ListResponse, PaginationParams};

/// Fields searched by the listing's `search` parameter
const SEARCH_FIELDS: [&str; 1] = ["summary"];

/// Task creation request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub summary: String,
    pub description: Option<String>,
}

/// Task edit request
#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Task representation returned by every endpoint
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub summary: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.unwrap_or_default(),
            summary: task.summary,
            description: task.description,
            status: task.status,
            created_at: task.created_at.to_chrono(),
            created_by: task.created_by,
        }
    }
}

/// Paginated task listing, scoped to the caller unless admin
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<PaginationParams>,
    Query(raw_params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let projected = params.fields.is_some();
    let query = params.into_query(raw_params, &SEARCH_FIELDS);

    if projected {
        let page = state.tasks.base().list_raw(query, false, Some(&ctx)).await?;
        let results: Vec<serde_json::Value> = page.results.iter().map(document_to_json).collect();
        return Ok(Json(ListResponse {
            total_items: page.total_items,
            total_pages: page.total_pages,
            records_per_page: page.records_per_page,
            results,
        })
        .into_response());
    }

    let page = state.tasks.base().list(query, false, Some(&ctx)).await?;
    let results: Vec<TaskResponse> = page.results.into_iter().map(Into::into).collect();
    Ok(Json(ListResponse {
        total_items: page.total_items,
        total_pages: page.total_pages,
        records_per_page: page.records_per_page,
        results,
    })
    .into_response())
}

/// Returns one task by id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(params): Query<FieldsParam>,
) -> ApiResult<Response> {
    if let Some(fields) = params.fields.as_deref() {
        let document = state
            .tasks
            .base()
            .find_raw_by_id(&id, Some(fields), false, Some(&ctx))
            .await?
            .ok_or_else(|| AppError::not_found("tasks", id.as_str()))?;
        return Ok(Json(document_to_json(&document)).into_response());
    }

    let task = state.tasks.base().get_by_id(&id, false, Some(&ctx)).await?;
    Ok(Json(TaskResponse::from(task)).into_response())
}

/// Creates a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state
        .tasks
        .create(req.summary, req.description, &ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Edits a task
///
/// Fails with `304 Not Modified` when the payload matches the stored values.
pub async fn edit_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(req): Json<EditTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .tasks
        .edit(
            &id,
            TaskEdit {
                summary: req.summary,
                description: req.description,
                status: req.status,
            },
            &ctx,
        )
        .await?;
    Ok(Json(task.into()))
}

/// Soft-deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.base().soft_delete_by_id(&id, Some(&ctx)).await?;
    Ok(StatusCode::NO_CONTENT)
}
