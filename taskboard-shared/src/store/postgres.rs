/// PostgreSQL store
///
/// Thin delegation to the model operations, except for filtered task
/// listings: each [`Predicate`] becomes one `WHERE` fragment with a bound
/// parameter, joined with `AND`.
///
/// ```text
/// TitleContains(s) -> POSITION(LOWER($n) IN LOWER(t.name)) > 0
/// AssigneeIs(id)   -> t.assignee_id = $n
/// StatusIs(slug)   -> s.slug = $n
/// HasLabel(id)     -> EXISTS (SELECT 1 FROM task_labels fl
///                             WHERE fl.task_id = t.id AND fl.label_id = $n)
/// ```
///
/// The label predicate is a subquery so the hydrated label set of a matching
/// task still contains all of its labels.

use super::Store;
use crate::db::pool;
use crate::error::CoreResult;
use crate::filter::{Predicate, TaskFilter};
use crate::models::label::{CreateLabel, Label};
use crate::models::task::{NewTask, Task, TaskRow, HYDRATED_GROUP_ORDER, HYDRATED_SELECT};
use crate::models::task_status::{CreateTaskStatus, TaskStatus};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Builds the hydrated task query for `filter`
pub fn filter_query(filter: &TaskFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(HYDRATED_SELECT);

    for (i, predicate) in filter.predicates().iter().enumerate() {
        query.push(if i == 0 { " WHERE " } else { " AND " });

        match predicate {
            Predicate::TitleContains(needle) => {
                query.push("POSITION(LOWER(");
                query.push_bind(needle.clone());
                query.push(") IN LOWER(t.name)) > 0");
            }
            Predicate::AssigneeIs(user_id) => {
                query.push("t.assignee_id = ");
                query.push_bind(*user_id);
            }
            Predicate::StatusIs(slug) => {
                query.push("s.slug = ");
                query.push_bind(slug.clone());
            }
            Predicate::HasLabel(label_id) => {
                query.push(
                    "EXISTS (SELECT 1 FROM task_labels fl WHERE fl.task_id = t.id AND fl.label_id = ",
                );
                query.push_bind(*label_id);
                query.push(")");
            }
        }
    }

    query.push(HYDRATED_GROUP_ORDER);
    query
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: i64) -> CoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn user_exists_by_email(&self, email: &str) -> CoreResult<bool> {
        Ok(User::exists_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self) -> CoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn insert_user(&self, data: NewUser) -> CoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn update_user(&self, user: &User) -> CoreResult<Option<User>> {
        Ok(User::update(&self.pool, user).await?)
    }

    async fn delete_user(&self, id: i64) -> CoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn find_status(&self, id: i64) -> CoreResult<Option<TaskStatus>> {
        Ok(TaskStatus::find_by_id(&self.pool, id).await?)
    }

    async fn find_status_by_slug(&self, slug: &str) -> CoreResult<Option<TaskStatus>> {
        Ok(TaskStatus::find_by_slug(&self.pool, slug).await?)
    }

    async fn status_exists_by_slug(&self, slug: &str) -> CoreResult<bool> {
        Ok(TaskStatus::exists_by_slug(&self.pool, slug).await?)
    }

    async fn list_statuses(&self) -> CoreResult<Vec<TaskStatus>> {
        Ok(TaskStatus::list(&self.pool).await?)
    }

    async fn insert_status(&self, data: CreateTaskStatus) -> CoreResult<TaskStatus> {
        Ok(TaskStatus::create(&self.pool, data).await?)
    }

    async fn update_status(&self, status: &TaskStatus) -> CoreResult<Option<TaskStatus>> {
        Ok(TaskStatus::update(&self.pool, status).await?)
    }

    async fn delete_status(&self, id: i64) -> CoreResult<bool> {
        Ok(TaskStatus::delete(&self.pool, id).await?)
    }

    async fn count_tasks_with_status(&self, status_id: i64) -> CoreResult<i64> {
        Ok(TaskStatus::count_tasks(&self.pool, status_id).await?)
    }

    async fn find_label(&self, id: i64) -> CoreResult<Option<Label>> {
        Ok(Label::find_by_id(&self.pool, id).await?)
    }

    async fn label_exists_by_name(&self, name: &str) -> CoreResult<bool> {
        Ok(Label::exists_by_name(&self.pool, name).await?)
    }

    async fn list_labels(&self) -> CoreResult<Vec<Label>> {
        Ok(Label::list(&self.pool).await?)
    }

    async fn insert_label(&self, data: CreateLabel) -> CoreResult<Label> {
        Ok(Label::create(&self.pool, data).await?)
    }

    async fn update_label(&self, label: &Label) -> CoreResult<Option<Label>> {
        Ok(Label::update(&self.pool, label).await?)
    }

    async fn delete_label(&self, id: i64) -> CoreResult<bool> {
        Ok(Label::delete(&self.pool, id).await?)
    }

    async fn find_task(&self, id: i64) -> CoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> CoreResult<Vec<Task>> {
        if filter.is_empty() {
            return Ok(Task::list(&self.pool).await?);
        }

        let rows = filter_query(filter)
            .build_query_as::<TaskRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn insert_task(&self, data: NewTask) -> CoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn update_task(&self, task: &Task) -> CoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, task).await?)
    }

    async fn delete_task(&self, id: i64) -> CoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn health_check(&self) -> CoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
