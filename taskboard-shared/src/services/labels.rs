/// Label service
///
/// Deleting a label detaches it from every task that carried it.

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::merge::{merge_label, prepare_label};
use crate::models::label::{CreateLabel, Label, UpdateLabel};
use crate::store::Store;
use tracing::info;

pub async fn list(store: &dyn Store) -> CoreResult<Vec<Label>> {
    store.list_labels().await
}

pub async fn get(store: &dyn Store, id: i64) -> CoreResult<Label> {
    store
        .find_label(id)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::Label, id))
}

pub async fn create(store: &dyn Store, data: CreateLabel) -> CoreResult<Label> {
    let data = prepare_label(store, data).await?;
    let label = store.insert_label(data).await?;

    info!(label_id = label.id, name = %label.name, "Label created");
    Ok(label)
}

pub async fn update(store: &dyn Store, id: i64, update: UpdateLabel) -> CoreResult<Label> {
    let mut label = get(store, id).await?;
    merge_label(store, &mut label, update).await?;

    let label = store
        .update_label(&label)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::Label, id))?;

    info!(label_id = label.id, name = %label.name, "Label updated");
    Ok(label)
}

pub async fn delete(store: &dyn Store, id: i64) -> CoreResult<()> {
    if !store.delete_label(id).await? {
        return Err(CoreError::not_found(EntityKind::Label, id));
    }
    info!(label_id = id, "Label deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use crate::models::task_status::CreateTaskStatus;
    use crate::store::MemoryStore;
    use std::collections::BTreeSet;

    fn label(name: &str) -> CreateLabel {
        CreateLabel {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_short_names() {
        let store = MemoryStore::new();
        create(&store, label("feature")).await.unwrap();

        assert!(matches!(
            create(&store, label("feature")).await,
            Err(CoreError::DuplicateKey { entity: EntityKind::Label, .. })
        ));
        assert!(matches!(
            create(&store, label("ab")).await,
            Err(CoreError::ValidationFailed(_))
        ));
        assert_eq!(list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_detaches_from_tasks() {
        let store = MemoryStore::new();
        let feature = create(&store, label("feature")).await.unwrap();
        let bug = create(&store, label("bug")).await.unwrap();
        let status = store
            .insert_status(CreateTaskStatus {
                name: "Draft".to_string(),
                slug: "draft".to_string(),
            })
            .await
            .unwrap();
        let task = store
            .insert_task(NewTask {
                index: None,
                assignee_id: None,
                name: "Fix login bug".to_string(),
                description: None,
                task_status_id: status.id,
                label_ids: BTreeSet::from([feature.id, bug.id]),
            })
            .await
            .unwrap();

        delete(&store, bug.id).await.unwrap();

        let task = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.label_ids, BTreeSet::from([feature.id]));
        assert!(matches!(delete(&store, bug.id).await, Err(CoreError::NotFound { .. })));
    }
}
