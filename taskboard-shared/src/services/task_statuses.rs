/// Task status service

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::merge::{merge_status, prepare_status};
use crate::models::task_status::{CreateTaskStatus, TaskStatus, UpdateTaskStatus};
use crate::store::Store;
use tracing::{info, warn};

pub async fn list(store: &dyn Store) -> CoreResult<Vec<TaskStatus>> {
    store.list_statuses().await
}

pub async fn get(store: &dyn Store, id: i64) -> CoreResult<TaskStatus> {
    store
        .find_status(id)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::TaskStatus, id))
}

pub async fn create(store: &dyn Store, data: CreateTaskStatus) -> CoreResult<TaskStatus> {
    let data = prepare_status(store, data).await?;
    let status = store.insert_status(data).await?;

    info!(status_id = status.id, slug = %status.slug, "Task status created");
    Ok(status)
}

pub async fn update(store: &dyn Store, id: i64, update: UpdateTaskStatus) -> CoreResult<TaskStatus> {
    let mut status = get(store, id).await?;
    merge_status(store, &mut status, update).await?;

    let status = store
        .update_status(&status)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::TaskStatus, id))?;

    info!(status_id = status.id, slug = %status.slug, "Task status updated");
    Ok(status)
}

/// Deletes a status no task uses
pub async fn delete(store: &dyn Store, id: i64) -> CoreResult<()> {
    let status = get(store, id).await?;

    let in_use = store.count_tasks_with_status(status.id).await?;
    if in_use > 0 {
        warn!(status_id = id, tasks = in_use, "Refusing to delete status in use");
        return Err(CoreError::InUse {
            entity: EntityKind::TaskStatus,
            id,
        });
    }

    if !store.delete_status(id).await? {
        return Err(CoreError::not_found(EntityKind::TaskStatus, id));
    }
    info!(status_id = id, slug = %status.slug, "Task status deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn draft() -> CreateTaskStatus {
        CreateTaskStatus {
            name: "Draft".to_string(),
            slug: "draft".to_string(),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryStore::new();
        let status = create(&store, draft()).await.unwrap();

        assert!(matches!(
            create(&store, draft()).await,
            Err(CoreError::DuplicateKey { field: "slug", .. })
        ));

        let payload: UpdateTaskStatus = serde_json::from_value(json!({ "name": "Backlog" })).unwrap();
        let updated = update(&store, status.id, payload).await.unwrap();
        assert_eq!(updated.name, "Backlog");
        assert_eq!(updated.slug, "draft");

        assert_eq!(list(&store).await.unwrap(), vec![updated]);

        delete(&store, status.id).await.unwrap();
        assert!(list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_status_in_use() {
        let store = MemoryStore::new();
        let status = create(&store, draft()).await.unwrap();
        store
            .insert_task(NewTask {
                index: None,
                assignee_id: None,
                name: "Fix login bug".to_string(),
                description: None,
                task_status_id: status.id,
                label_ids: BTreeSet::new(),
            })
            .await
            .unwrap();

        assert!(matches!(
            delete(&store, status.id).await,
            Err(CoreError::InUse { entity: EntityKind::TaskStatus, .. })
        ));
        assert!(get(&store, status.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_slug_rejected() {
        let store = MemoryStore::new();
        let err = create(
            &store,
            CreateTaskStatus {
                name: "Draft".to_string(),
                slug: " ".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed(_)));
    }
}
