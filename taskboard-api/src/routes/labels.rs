/// Label endpoints
///
/// - `GET /api/labels` - List labels
/// - `POST /api/labels` - Create label
/// - `GET /api/labels/:id` - Get label
/// - `PUT /api/labels/:id` - Rename label
/// - `DELETE /api/labels/:id` - Delete label, detaching it from tasks

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
use taskboard_shared::models::label::{CreateLabel, Label, UpdateLabel};
use taskboard_shared::services::labels;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDate,
}

impl From<Label> for LabelResponse {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            created_at: date(label.created_at),
        }
    }
}

pub async fn list_labels(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let labels = labels::list(state.store()).await?;
    Ok(list_response(labels.into_iter().map(LabelResponse::from).collect()))
}

pub async fn get_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<LabelResponse>> {
    let label = labels::get(state.store(), id).await?;
    Ok(Json(label.into()))
}

pub async fn create_label(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateLabel>,
) -> ApiResult<(StatusCode, Json<LabelResponse>)> {
    let label = labels::create(state.store(), req).await?;
    Ok((StatusCode::CREATED, Json(label.into())))
}

pub async fn update_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateLabel>,
) -> ApiResult<Json<LabelResponse>> {
    let label = labels::update(state.store(), id, req).await?;
    Ok(Json(label.into()))
}

pub async fn delete_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    labels::delete(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
