/// Task status model and database operations
///
/// Statuses are referenced by clients through their `slug`, never by the
/// internal id. They are created once (seed data plus the odd admin create)
/// and cannot be deleted while any task still points at them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_statuses (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::patch::{self, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::{Validate, ValidationErrors};

/// Task status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskStatus {
    pub id: i64,

    /// Display name, e.g. "To review"
    pub name: String,

    /// Stable external key, e.g. "to_review"
    pub slug: String,

    pub created_at: DateTime<Utc>,
}

/// Creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskStatus {
    pub name: String,
    pub slug: String,
}

impl Validate for CreateTaskStatus {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        patch::require_not_blank(&mut errors, "name", &self.name);
        patch::require_not_blank(&mut errors, "slug", &self.slug);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update payload; both fields are non-nullable
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTaskStatus {
    pub name: Patch<String>,
    pub slug: Patch<String>,
}

impl Validate for UpdateTaskStatus {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        patch::reject_null(&mut errors, "name", &self.name);
        patch::check_not_blank(&mut errors, "name", &self.name);
        patch::reject_null(&mut errors, "slug", &self.slug);
        patch::check_not_blank(&mut errors, "slug", &self.slug);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl TaskStatus {
    /// Inserts a new status
    pub async fn create(pool: &PgPool, data: CreateTaskStatus) -> Result<Self, sqlx::Error> {
        let status = sqlx::query_as::<_, TaskStatus>(
            r#"
            INSERT INTO task_statuses (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await?;

        Ok(status)
    }

    /// Finds a status by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, slug, created_at FROM task_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Finds a status by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let status = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, slug, created_at FROM task_statuses WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(status)
    }

    /// Checks whether a slug is taken
    pub async fn exists_by_slug(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM task_statuses WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Lists all statuses ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let statuses = sqlx::query_as::<_, TaskStatus>(
            "SELECT id, name, slug, created_at FROM task_statuses ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(statuses)
    }

    /// Persists name and slug of an already-merged status
    pub async fn update(pool: &PgPool, status: &TaskStatus) -> Result<Option<Self>, sqlx::Error> {
        let updated = sqlx::query_as::<_, TaskStatus>(
            r#"
            UPDATE task_statuses
            SET name = $2, slug = $3
            WHERE id = $1
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(status.id)
        .bind(&status.name)
        .bind(&status.slug)
        .fetch_optional(pool)
        .await?;

        Ok(updated)
    }

    /// Counts tasks currently in this status
    pub async fn count_tasks(pool: &PgPool, id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE task_status_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a status
    ///
    /// Fails with a foreign-key violation if tasks still use it; callers check
    /// [`TaskStatus::count_tasks`] first.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_status_validation() {
        let valid = CreateTaskStatus {
            name: "Draft".to_string(),
            slug: "draft".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateTaskStatus {
            name: "  ".to_string(),
            slug: "draft".to_string(),
        };
        assert!(invalid.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn test_update_task_status_rejects_null_and_blank() {
        let update: UpdateTaskStatus =
            serde_json::from_value(serde_json::json!({ "name": null, "slug": " " })).unwrap();
        let errors = update.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("slug"));
    }
}
