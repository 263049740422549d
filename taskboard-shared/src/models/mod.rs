/// Database models for Taskboard
///
/// Each model owns its SQL operations and the request shapes used to create
/// and partially update it.
///
/// # Models
///
/// - `user`: User accounts, also the assignee side of tasks
/// - `task_status`: Workflow statuses keyed by slug
/// - `label`: Labels attached to tasks through `task_labels`
/// - `task`: Tasks with their status slug and label set
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task_status::{CreateTaskStatus, TaskStatus};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let draft = TaskStatus::create(&pool, CreateTaskStatus {
///     name: "Draft".to_string(),
///     slug: "draft".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod label;
pub mod task;
pub mod task_status;
pub mod user;
