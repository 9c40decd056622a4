//! # Task Handlers
//!
//! HTTP handlers for task CRUD and paginated listing. Handlers parse and
//! validate request input, then delegate to the service facade; pagination
//! defaults come from server configuration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{Task, TaskChanges};
use crate::repository::{SortOrder, SortSpec, TaskFilter};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Stable id assigned by the caller; generated when omitted.
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub priority: i32,
}

fn default_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Create a task: `POST /tasks`.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }

    let now = Utc::now();
    let task = Task {
        id: request
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        title: request.title,
        description: request.description,
        status: request.status,
        priority: request.priority,
        created_at: now,
        updated_at: now,
    };

    state.service.create_task(&task).await?;
    info!(id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch one task: `GET /tasks/{id}`.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state.service.get_task(&id).await?;
    Ok(Json(task))
}

/// List tasks: `GET /tasks?page=&page_size=&status=&priority=&sort_by=&order=`.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let page = query.page.unwrap_or(state.server.default_page);
    let page_size = query.page_size.unwrap_or(state.server.default_page_size);
    if page < 1 || page_size < 1 {
        return Err(ApiError::bad_request("page and page_size must be >= 1"));
    }

    let order = match query.order.as_deref() {
        None | Some("asc") => SortOrder::Asc,
        Some("desc") => SortOrder::Desc,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "order must be asc or desc, got {other}"
            )))
        }
    };
    let sort = query.sort_by.map(|field| SortSpec { field, order });

    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
    };

    let tasks = state
        .service
        .list_tasks(&filter, sort.as_ref(), page, page_size)
        .await?;
    Ok(Json(tasks))
}

/// Update a task: `PUT /tasks/{id}` with a partial body.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<TaskChanges>,
) -> ApiResult<Json<Task>> {
    if let Some(title) = &changes.title {
        if title.trim().is_empty() {
            return Err(ApiError::bad_request("title must not be empty"));
        }
    }
    let task = state.service.update_task(&id, changes).await?;
    info!(id = %task.id, "task updated");
    Ok(Json(task))
}

/// Delete a task: `DELETE /tasks/{id}`.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete_task(&id).await?;
    info!(id = %id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
