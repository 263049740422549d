/// Per-entity orchestration
///
/// Each service function is one request's worth of work: read the target,
/// run the merger or preparation step, persist, and log. Handlers call these
/// and map [`CoreError`](crate::error::CoreError) to transport responses.
///
/// ```text
/// update(id, payload)
///   find(id)                  -> NotFound
///   merge(entity, payload)    -> ValidationFailed | NotFound | DuplicateKey
///   store.update(entity)      -> NotFound if the row vanished meanwhile
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::filter::{TaskFilter, TaskFilterParams};
/// use taskboard_shared::services::tasks;
/// use taskboard_shared::store::MemoryStore;
///
/// # async fn example(store: MemoryStore) -> Result<(), Box<dyn std::error::Error>> {
/// let params = TaskFilterParams {
///     status: Some("draft".to_string()),
///     ..Default::default()
/// };
/// let drafts = tasks::list(&store, &TaskFilter::build(&params)).await?;
/// println!("{} drafts", drafts.len());
/// # Ok(())
/// # }
/// ```

pub mod labels;
pub mod task_statuses;
pub mod tasks;
pub mod users;
