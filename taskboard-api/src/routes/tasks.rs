/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks` - List tasks, optionally filtered
/// - `POST /api/tasks` - Create task
/// - `GET /api/tasks/:id` - Get task
/// - `PUT /api/tasks/:id` - Partially update task
/// - `DELETE /api/tasks/:id` - Delete task
///
/// # Filtering
///
/// ```text
/// GET /api/tasks?titleCont=bug&status=draft&assigneeId=7&labelId=2
/// ```
///
/// Every supplied parameter must match.
///
/// # Partial updates
///
/// ```text
/// PUT /api/tasks/1
///
/// { "content": null, "status": "published" }
/// ```
///
/// Absent fields are kept, `null` clears nullable fields (and empties
/// `taskLabelIds`), values overwrite. `title` and `status` reject `null`.

use super::{date, list_response, ApiJson};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_shared::filter::{TaskFilter, TaskFilterParams};
use taskboard_shared::models::task::{CreateTask, Task, UpdateTask};
use taskboard_shared::services::tasks;

/// Task representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,

    pub index: Option<i32>,

    #[serde(rename = "assignee_id")]
    pub assignee_id: Option<i64>,

    pub title: String,

    pub content: Option<String>,

    /// Status slug
    pub status: String,

    pub task_label_ids: Vec<i64>,

    pub created_at: NaiveDate,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            index: task.index,
            assignee_id: task.assignee_id,
            title: task.name,
            content: task.description,
            status: task.status_slug,
            task_label_ids: task.label_ids.into_iter().collect(),
            created_at: date(task.created_at),
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskFilterParams>,
) -> ApiResult<impl IntoResponse> {
    let filter = TaskFilter::build(&params);
    let tasks = tasks::list(state.store(), &filter).await?;
    Ok(list_response(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskResponse>> {
    let task = tasks::get(state.store(), id).await?;
    Ok(Json(task.into()))
}

/// Creates a task
///
/// # Errors
///
/// - `404 Not Found`: Unknown status slug, label id or assignee id
/// - `422 Unprocessable Entity`: Blank title or status
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = tasks::create(state.store(), req).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Applies a partial update
///
/// Nothing is written unless every field validates and every reference
/// resolves.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateTask>,
) -> ApiResult<Json<TaskResponse>> {
    let task = tasks::update(state.store(), id, req).await?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    tasks::delete(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
