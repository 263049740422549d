/// Common test utilities for integration tests
///
/// Every test gets its own seeded in-memory store behind the full router,
/// plus a token for the seeded user. Requests go through
/// `tower::ServiceExt::oneshot`, so no socket is opened.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::seed::{seed, DEFAULT_USER_EMAIL};
use taskboard_shared::store::{MemoryStore, Store};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub store: MemoryStore,
    pub user_id: i64,
    pub token: String,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn total_count(&self) -> Option<usize> {
        self.headers
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }
}

impl TestContext {
    /// Creates a seeded context: statuses draft..published (ids 1-5), labels
    /// feature (1) and bug (2), and the default user
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        seed(&store).await.expect("seed");

        let config = Config::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })
        .expect("config");

        let user = store
            .find_user_by_email(DEFAULT_USER_EMAIL)
            .await
            .expect("lookup")
            .expect("seeded user");
        let token = token_for(user.id, &user.email);

        let state = AppState::new(Arc::new(store.clone()), config);

        Self {
            app: build_router(state),
            store,
            user_id: user.id,
            token,
        }
    }

    /// Sends a request with the seeded user's token
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_as(Some(&self.token), method, uri, body).await
    }

    /// Sends a request with an explicit token, or none
    pub async fn send_as(
        &self,
        token: Option<&str>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub fn token_for(user_id: i64, email: &str) -> String {
    let claims = Claims::new(user_id, email, chrono::Duration::hours(1));
    create_token(&claims, TEST_SECRET).expect("token")
}
