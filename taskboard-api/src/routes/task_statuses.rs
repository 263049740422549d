/// Task status endpoints
///
/// - `GET /api/task_statuses` - List statuses
/// - `POST /api/task_statuses` - Create status
/// - `GET /api/task_statuses/:id` - Get status
/// - `PUT /api/task_statuses/:id` - Update status
/// - `DELETE /api/task_statuses/:id` - Delete status (409 while tasks use it)

use super::{date, list_response, ApiJson};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_shared::models::task_status::{CreateTaskStatus, TaskStatus, UpdateTaskStatus};
use taskboard_shared::services::task_statuses;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: NaiveDate,
}

impl From<TaskStatus> for TaskStatusResponse {
    fn from(status: TaskStatus) -> Self {
        Self {
            id: status.id,
            name: status.name,
            slug: status.slug,
            created_at: date(status.created_at),
        }
    }
}

pub async fn list_statuses(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let statuses = task_statuses::list(state.store()).await?;
    Ok(list_response(
        statuses.into_iter().map(TaskStatusResponse::from).collect(),
    ))
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskStatusResponse>> {
    let status = task_statuses::get(state.store(), id).await?;
    Ok(Json(status.into()))
}

pub async fn create_status(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTaskStatus>,
) -> ApiResult<(StatusCode, Json<TaskStatusResponse>)> {
    let status = task_statuses::create(state.store(), req).await?;
    Ok((StatusCode::CREATED, Json(status.into())))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateTaskStatus>,
) -> ApiResult<Json<TaskStatusResponse>> {
    let status = task_statuses::update(state.store(), id, req).await?;
    Ok(Json(status.into()))
}

pub async fn delete_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    task_statuses::delete(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
