/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "username": "hexlet@example.com",
///   "password": "qwerty"
/// }
/// ```
///
/// The response body is the bare JWT, to be sent back as
/// `Authorization: Bearer <token>`.

use super::ApiJson;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::extract::State;
use serde::Deserialize;
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::services::users;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User email
    pub username: String,

    pub password: String,
}

/// Exchanges credentials for an access token
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<String> {
    let user = users::authenticate(state.store(), &req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let claims = Claims::new(user.id, user.email.clone(), state.config.token_ttl());
    let token = create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(token)
}
