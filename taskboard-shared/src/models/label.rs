/// Label model and database operations
///
/// Labels attach to tasks through the `task_labels` join relation. Deleting a
/// label only removes its links; the tasks stay.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE labels (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(1000) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::patch::{self, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::{Validate, ValidationErrors};

/// Label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    pub id: i64,

    /// Unique name, 3-1000 characters
    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// Creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLabel {
    #[validate(length(min = 3, max = 1000, message = "Name must be 3-1000 characters"))]
    pub name: String,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateLabel {
    pub name: Patch<String>,
}

impl Validate for UpdateLabel {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        patch::reject_null(&mut errors, "name", &self.name);
        patch::check_length(&mut errors, "name", &self.name, 3, 1000);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Label {
    /// Inserts a new label
    pub async fn create(pool: &PgPool, data: CreateLabel) -> Result<Self, sqlx::Error> {
        let label = sqlx::query_as::<_, Label>(
            "INSERT INTO labels (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(label)
    }

    /// Finds a label by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let label =
            sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(label)
    }

    /// Checks whether a name is taken
    pub async fn exists_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM labels WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Lists all labels ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let labels = sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels ORDER BY id")
            .fetch_all(pool)
            .await?;

        Ok(labels)
    }

    /// Persists the name of an already-merged label
    pub async fn update(pool: &PgPool, label: &Label) -> Result<Option<Self>, sqlx::Error> {
        let updated = sqlx::query_as::<_, Label>(
            "UPDATE labels SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(label.id)
        .bind(&label.name)
        .fetch_optional(pool)
        .await?;

        Ok(updated)
    }

    /// Deletes a label and its task links
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
