/// Task model and database operations
///
/// A task references exactly one status, optionally one assignee, and any
/// number of labels. Labels are stored in the `task_labels` join relation;
/// the hydrated [`Task`] only carries the derived set of label ids.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     "index" INTEGER,
///     assignee_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     task_status_id BIGINT NOT NULL REFERENCES task_statuses(id) ON DELETE RESTRICT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_labels (
///     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     label_id BIGINT NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```
///
/// # Wire names
///
/// Request payloads use `title` for `name`, `content` for `description` and
/// `taskLabelIds` for the label set, while `index` and `assignee_id` keep
/// their column names.

use crate::patch::{self, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::BTreeSet;
use validator::{Validate, ValidationErrors};

/// Columns of a hydrated task, without the trailing `WHERE`/`GROUP BY`
///
/// Filtered listings append their own predicates to this prefix; label
/// predicates must go through a subquery so the aggregate keeps every label.
pub const HYDRATED_SELECT: &str = r#"
    SELECT t.id,
           t."index",
           t.assignee_id,
           t.name,
           t.description,
           t.task_status_id,
           s.slug AS status_slug,
           COALESCE(
               ARRAY_AGG(tl.label_id ORDER BY tl.label_id) FILTER (WHERE tl.label_id IS NOT NULL),
               '{}'
           ) AS label_ids,
           t.created_at
    FROM tasks t
    JOIN task_statuses s ON s.id = t.task_status_id
    LEFT JOIN task_labels tl ON tl.task_id = t.id
"#;

/// Grouping and ordering that must follow [`HYDRATED_SELECT`] and any predicates
pub const HYDRATED_GROUP_ORDER: &str = " GROUP BY t.id, s.slug ORDER BY t.id";

/// Task with its status slug and label set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,

    /// Optional ordering index
    pub index: Option<i32>,

    /// Assigned user, if any
    pub assignee_id: Option<i64>,

    /// Title, never blank
    pub name: String,

    pub description: Option<String>,

    pub task_status_id: i64,

    /// Slug of the referenced status
    pub status_slug: String,

    /// Ids of the attached labels
    pub label_ids: BTreeSet<i64>,

    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Returns true if the label is attached to this task
    pub fn has_label(&self, label_id: i64) -> bool {
        self.label_ids.contains(&label_id)
    }
}

/// Raw row of [`HYDRATED_SELECT`]
#[derive(Debug, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub index: Option<i32>,
    pub assignee_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub task_status_id: i64,
    pub status_slug: String,
    pub label_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            index: row.index,
            assignee_id: row.assignee_id,
            name: row.name,
            description: row.description,
            task_status_id: row.task_status_id,
            status_slug: row.status_slug,
            label_ids: row.label_ids.into_iter().collect(),
            created_at: row.created_at,
        }
    }
}

/// Creation payload
///
/// `status` is a slug and `taskLabelIds` may repeat ids; both are resolved
/// before anything is written.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    #[serde(default)]
    pub index: Option<i32>,

    #[serde(default)]
    pub assignee_id: Option<i64>,

    #[serde(rename = "title")]
    pub name: String,

    #[serde(rename = "content", default)]
    pub description: Option<String>,

    pub status: String,

    #[serde(rename = "taskLabelIds", default)]
    pub label_ids: Option<Vec<i64>>,
}

impl Validate for CreateTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        patch::require_not_blank(&mut errors, "title", &self.name);
        patch::require_length(&mut errors, "title", &self.name, 1, 255);
        patch::require_not_blank(&mut errors, "status", &self.status);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update payload
///
/// `title` and `status` are non-nullable; `taskLabelIds: null` empties the
/// label set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTask {
    pub index: Patch<i32>,

    pub assignee_id: Patch<i64>,

    #[serde(rename = "title")]
    pub name: Patch<String>,

    #[serde(rename = "content")]
    pub description: Patch<String>,

    pub status: Patch<String>,

    #[serde(rename = "taskLabelIds")]
    pub label_ids: Patch<Vec<i64>>,
}

impl Validate for UpdateTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        patch::reject_null(&mut errors, "title", &self.name);
        patch::check_not_blank(&mut errors, "title", &self.name);
        patch::check_length(&mut errors, "title", &self.name, 1, 255);
        patch::reject_null(&mut errors, "status", &self.status);
        patch::check_not_blank(&mut errors, "status", &self.status);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Insert data with every reference already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub index: Option<i32>,
    pub assignee_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub task_status_id: i64,
    pub label_ids: BTreeSet<i64>,
}

impl Task {
    /// Inserts a task and its label links in one transaction
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks ("index", assignee_id, name, description, task_status_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(data.index)
        .bind(data.assignee_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.task_status_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_labels(&mut *tx, id, &data.label_ids).await?;
        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Finds a hydrated task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("{HYDRATED_SELECT} WHERE t.id = $1{HYDRATED_GROUP_ORDER}");
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Task::from))
    }

    /// Lists every task ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!("{HYDRATED_SELECT}{HYDRATED_GROUP_ORDER}");
        let rows = sqlx::query_as::<_, TaskRow>(&sql).fetch_all(pool).await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Persists an already-merged task, replacing its label links
    ///
    /// Returns `None` if the task no longer exists.
    pub async fn update(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET "index" = $2,
                assignee_id = $3,
                name = $4,
                description = $5,
                task_status_id = $6
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(task.index)
        .bind(task.assignee_id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.task_status_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(task.id)
            .execute(&mut *tx)
            .await?;
        Self::link_labels(&mut *tx, task.id, &task.label_ids).await?;
        tx.commit().await?;

        Self::find_by_id(pool, task.id).await
    }

    /// Deletes a task and its label links
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn link_labels(
        conn: &mut PgConnection,
        task_id: i64,
        label_ids: &BTreeSet<i64>,
    ) -> Result<(), sqlx::Error> {
        if label_ids.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = label_ids.iter().copied().collect();
        sqlx::query(
            r#"
            INSERT INTO task_labels (task_id, label_id)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(ids)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_task_wire_names() {
        let create: CreateTask = serde_json::from_value(json!({
            "title": "Fix login bug",
            "content": "Users cannot log in",
            "status": "draft",
            "assignee_id": 7,
            "taskLabelIds": [1, 1, 2]
        }))
        .unwrap();

        assert_eq!(create.name, "Fix login bug");
        assert_eq!(create.description.as_deref(), Some("Users cannot log in"));
        assert_eq!(create.assignee_id, Some(7));
        assert_eq!(create.label_ids, Some(vec![1, 1, 2]));
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_create_task_requires_title_and_status() {
        let missing: Result<CreateTask, _> = serde_json::from_value(json!({ "status": "draft" }));
        assert!(missing.is_err());

        let blank: CreateTask =
            serde_json::from_value(json!({ "title": "  ", "status": "" })).unwrap();
        let errors = blank.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("status"));
    }

    #[test]
    fn test_update_task_tri_state() {
        let update: UpdateTask = serde_json::from_value(json!({
            "content": null,
            "taskLabelIds": [3]
        }))
        .unwrap();

        assert!(update.name.is_unset());
        assert!(update.status.is_unset());
        assert!(update.description.is_clear());
        assert_eq!(update.label_ids, Patch::Set(vec![3]));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_task_rejects_null_title() {
        let update: UpdateTask =
            serde_json::from_value(json!({ "title": null, "status": null })).unwrap();
        let errors = update.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("status"));
    }

    #[test]
    fn test_row_conversion_collapses_labels() {
        let row = TaskRow {
            id: 1,
            index: None,
            assignee_id: None,
            name: "Write docs".to_string(),
            description: None,
            task_status_id: 2,
            status_slug: "published".to_string(),
            label_ids: vec![2, 1],
            created_at: Utc::now(),
        };

        let task = Task::from(row);
        assert_eq!(task.label_ids.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert!(task.has_label(2));
        assert!(!task.has_label(3));
    }
}
