/// Storage abstraction
///
/// The resolver, the merger and the services only talk to a [`Store`]. Two
/// implementations exist:
///
/// - [`postgres::PgStore`]: sqlx over a `PgPool`, filters translated to SQL
/// - [`memory::MemoryStore`]: maps behind a `tokio::sync::RwLock`, filters
///   evaluated in-process
///
/// Both keep task labels as a join relation of `(task_id, label_id)` pairs and
/// only expose it as the label set on a hydrated [`Task`].
///
/// Lifecycle rules shared by both implementations:
///
/// - deleting a user unassigns their tasks
/// - deleting a label detaches it from every task
/// - deleting a task detaches its labels
///
/// Deleting a status that tasks still use is refused; the PostgreSQL schema
/// enforces it with `ON DELETE RESTRICT`, the service layer checks
/// [`Store::count_tasks_with_status`] first.

pub mod memory;
pub mod postgres;

use crate::error::CoreResult;
use crate::filter::TaskFilter;
use crate::models::label::{CreateLabel, Label};
use crate::models::task::{NewTask, Task};
use crate::models::task_status::{CreateTaskStatus, TaskStatus};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage collaborator
///
/// `find_*` returns `None` for a missing row, `update_*` returns `None` if
/// the row vanished, `delete_*` returns whether a row was removed.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: i64) -> CoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;
    async fn user_exists_by_email(&self, email: &str) -> CoreResult<bool>;
    async fn list_users(&self) -> CoreResult<Vec<User>>;
    async fn insert_user(&self, data: NewUser) -> CoreResult<User>;
    async fn update_user(&self, user: &User) -> CoreResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> CoreResult<bool>;

    async fn find_status(&self, id: i64) -> CoreResult<Option<TaskStatus>>;
    async fn find_status_by_slug(&self, slug: &str) -> CoreResult<Option<TaskStatus>>;
    async fn status_exists_by_slug(&self, slug: &str) -> CoreResult<bool>;
    async fn list_statuses(&self) -> CoreResult<Vec<TaskStatus>>;
    async fn insert_status(&self, data: CreateTaskStatus) -> CoreResult<TaskStatus>;
    async fn update_status(&self, status: &TaskStatus) -> CoreResult<Option<TaskStatus>>;
    async fn delete_status(&self, id: i64) -> CoreResult<bool>;

    /// Number of tasks whose status is `status_id`
    async fn count_tasks_with_status(&self, status_id: i64) -> CoreResult<i64>;

    async fn find_label(&self, id: i64) -> CoreResult<Option<Label>>;
    async fn label_exists_by_name(&self, name: &str) -> CoreResult<bool>;
    async fn list_labels(&self) -> CoreResult<Vec<Label>>;
    async fn insert_label(&self, data: CreateLabel) -> CoreResult<Label>;
    async fn update_label(&self, label: &Label) -> CoreResult<Option<Label>>;
    async fn delete_label(&self, id: i64) -> CoreResult<bool>;

    async fn find_task(&self, id: i64) -> CoreResult<Option<Task>>;

    /// Tasks matching every predicate of `filter`, ordered by id
    async fn list_tasks(&self, filter: &TaskFilter) -> CoreResult<Vec<Task>>;

    async fn insert_task(&self, data: NewTask) -> CoreResult<Task>;

    /// Persists scalar fields, status and the full label set of `task`
    async fn update_task(&self, task: &Task) -> CoreResult<Option<Task>>;

    async fn delete_task(&self, id: i64) -> CoreResult<bool>;

    /// Verifies the backend is reachable
    async fn health_check(&self) -> CoreResult<()>;

    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;
}
