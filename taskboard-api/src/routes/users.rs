/// User endpoints
///
/// - `GET /api/users` - List users
/// - `POST /api/users` - Register (public)
/// - `GET /api/users/:id` - Get user
/// - `PUT /api/users/:id` - Update own account
/// - `DELETE /api/users/:id` - Delete own account
///
/// Password digests never leave the server.

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
use taskboard_shared::auth::middleware::AuthContext;
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};
use taskboard_shared::services::users;

/// User representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDate,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: date(user.created_at),
        }
    }
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = users::list(state.store()).await?;
    Ok(list_response(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::get(state.store(), id).await?;
    Ok(Json(user.into()))
}

/// Registers a new account
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Invalid email or password length
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = users::create(state.store(), req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Updates the caller's own account
///
/// # Errors
///
/// - `403 Forbidden`: `id` is not the caller
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateUser>,
) -> ApiResult<Json<UserResponse>> {
    auth.require_user(id)?;
    let user = users::update(state.store(), id, req).await?;
    Ok(Json(user.into()))
}

/// Deletes the caller's own account
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    auth.require_user(id)?;
    users::delete(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
