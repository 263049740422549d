/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login
/// - `users`: Accounts (registration is public)
/// - `task_statuses`, `labels`, `tasks`: Task tracker resources
///
/// List endpoints report the number of rows in `X-Total-Count`. Request
/// bodies go through [`ApiJson`] so malformed payloads answer with the same
/// error body as every other failure.

pub mod auth;
pub mod health;
pub mod labels;
pub mod task_statuses;
pub mod tasks;
pub mod users;

use crate::error::ApiError;
use axum::{extract::FromRequest, http::HeaderName, response::IntoResponse, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Total row count header on list responses
pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// JSON request body; rejections become [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// JSON array response with `X-Total-Count`
pub fn list_response<T: Serialize>(items: Vec<T>) -> impl IntoResponse {
    ([(TOTAL_COUNT, items.len().to_string())], Json(items))
}

/// Timestamps are rendered as calendar dates
pub(crate) fn date(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}
