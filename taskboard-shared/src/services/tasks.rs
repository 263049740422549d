/// Task service

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::filter::TaskFilter;
use crate::merge::{merge_task, prepare_task};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::store::Store;
use tracing::{debug, info};

/// Tasks matching `filter`, ordered by id
pub async fn list(store: &dyn Store, filter: &TaskFilter) -> CoreResult<Vec<Task>> {
    let tasks = store.list_tasks(filter).await?;
    debug!(
        predicates = filter.predicates().len(),
        matched = tasks.len(),
        "Listed tasks"
    );
    Ok(tasks)
}

pub async fn get(store: &dyn Store, id: i64) -> CoreResult<Task> {
    store
        .find_task(id)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))
}

pub async fn create(store: &dyn Store, data: CreateTask) -> CoreResult<Task> {
    let new_task = prepare_task(store, data).await?;
    let task = store.insert_task(new_task).await?;

    info!(
        task_id = task.id,
        status = %task.status_slug,
        labels = task.label_ids.len(),
        "Task created"
    );
    Ok(task)
}

/// Applies a tri-state update; on any failure the stored task is unchanged
pub async fn update(store: &dyn Store, id: i64, update: UpdateTask) -> CoreResult<Task> {
    let mut task = get(store, id).await?;
    merge_task(store, &mut task, update).await?;

    let task = store
        .update_task(&task)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))?;

    info!(task_id = task.id, status = %task.status_slug, "Task updated");
    Ok(task)
}

pub async fn delete(store: &dyn Store, id: i64) -> CoreResult<()> {
    if !store.delete_task(id).await? {
        return Err(CoreError::not_found(EntityKind::Task, id));
    }
    info!(task_id = id, "Task deleted");
    Ok(())
}
