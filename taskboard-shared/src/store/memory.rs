/// In-memory store
///
/// Keeps every table in a `BTreeMap` keyed by id behind one
/// `tokio::sync::RwLock`, so listings come out in id order like the SQL
/// store. Task labels live in a separate set of `(task_id, label_id)` pairs,
/// the same join relation the database uses, and tasks are hydrated on read.
///
/// The store enforces what the PostgreSQL schema enforces: unique keys,
/// existing references on task writes, `SET NULL` on user delete, cascading
/// label links, and `RESTRICT` on status delete.
///
/// Used by the unit tests and by `STORAGE_BACKEND=memory`.
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task_status::CreateTaskStatus;
/// use taskboard_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.insert_status(CreateTaskStatus {
///     name: "Draft".to_string(),
///     slug: "draft".to_string(),
/// }).await?;
///
/// assert!(store.status_exists_by_slug("draft").await?);
/// # Ok(())
/// # }
/// ```

use super::Store;
use crate::error::{CoreError, CoreResult, EntityKind};
use crate::filter::TaskFilter;
use crate::models::label::{CreateLabel, Label};
use crate::models::task::{NewTask, Task};
use crate::models::task_status::{CreateTaskStatus, TaskStatus};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Task row without derived columns
#[derive(Debug, Clone)]
struct TaskRecord {
    id: i64,
    index: Option<i32>,
    assignee_id: Option<i64>,
    name: String,
    description: Option<String>,
    task_status_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    statuses: BTreeMap<i64, TaskStatus>,
    labels: BTreeMap<i64, Label>,
    tasks: BTreeMap<i64, TaskRecord>,

    /// `(task_id, label_id)` pairs
    task_labels: BTreeSet<(i64, i64)>,

    next_user_id: i64,
    next_status_id: i64,
    next_label_id: i64,
    next_task_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn hydrate(&self, record: &TaskRecord) -> Task {
        let status_slug = self
            .statuses
            .get(&record.task_status_id)
            .map(|s| s.slug.clone())
            .unwrap_or_default();

        Task {
            id: record.id,
            index: record.index,
            assignee_id: record.assignee_id,
            name: record.name.clone(),
            description: record.description.clone(),
            task_status_id: record.task_status_id,
            status_slug,
            label_ids: self.label_ids_of(record.id),
            created_at: record.created_at,
        }
    }

    fn label_ids_of(&self, task_id: i64) -> BTreeSet<i64> {
        self.task_labels
            .range((task_id, i64::MIN)..=(task_id, i64::MAX))
            .map(|&(_, label_id)| label_id)
            .collect()
    }

    fn unlink_task(&mut self, task_id: i64) {
        self.task_labels.retain(|&(t, _)| t != task_id);
    }

    fn link_task(&mut self, task_id: i64, label_ids: &BTreeSet<i64>) {
        for &label_id in label_ids {
            self.task_labels.insert((task_id, label_id));
        }
    }

    /// Foreign-key checks for a task write
    fn check_task_references(
        &self,
        task_status_id: i64,
        assignee_id: Option<i64>,
        label_ids: &BTreeSet<i64>,
    ) -> CoreResult<()> {
        if !self.statuses.contains_key(&task_status_id) {
            return Err(CoreError::not_found(EntityKind::TaskStatus, task_status_id));
        }
        if let Some(user_id) = assignee_id {
            if !self.users.contains_key(&user_id) {
                return Err(CoreError::not_found(EntityKind::User, user_id));
            }
        }
        if let Some(missing) = label_ids.iter().find(|id| !self.labels.contains_key(*id)) {
            return Err(CoreError::not_found(EntityKind::Label, missing));
        }
        Ok(())
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn slug_taken(&self, slug: &str, except: Option<i64>) -> bool {
        self.statuses
            .values()
            .any(|s| s.slug == slug && Some(s.id) != except)
    }

    fn label_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.labels
            .values()
            .any(|l| l.name == name && Some(l.id) != except)
    }
}

/// Store keeping everything in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: i64) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_exists_by_email(&self, email: &str) -> CoreResult<bool> {
        Ok(self.tables.read().await.email_taken(email, None))
    }

    async fn list_users(&self) -> CoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn insert_user(&self, data: NewUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.email_taken(&data.email, None) {
            return Err(CoreError::DuplicateKey {
                entity: EntityKind::User,
                field: "email",
                value: data.email,
            });
        }

        let now = Utc::now();
        let user = User {
            id: next_id(&mut tables.next_user_id),
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            password_digest: data.password_digest,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user(&self, user: &User) -> CoreResult<Option<User>> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user.id) {
            return Ok(None);
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(CoreError::DuplicateKey {
                entity: EntityKind::User,
                field: "email",
                value: user.email.clone(),
            });
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        tables.users.insert(updated.id, updated.clone());

        Ok(Some(updated))
    }

    async fn delete_user(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        for task in tables.tasks.values_mut() {
            if task.assignee_id == Some(id) {
                task.assignee_id = None;
            }
        }

        Ok(true)
    }

    async fn find_status(&self, id: i64) -> CoreResult<Option<TaskStatus>> {
        Ok(self.tables.read().await.statuses.get(&id).cloned())
    }

    async fn find_status_by_slug(&self, slug: &str) -> CoreResult<Option<TaskStatus>> {
        let tables = self.tables.read().await;
        Ok(tables.statuses.values().find(|s| s.slug == slug).cloned())
    }

    async fn status_exists_by_slug(&self, slug: &str) -> CoreResult<bool> {
        Ok(self.tables.read().await.slug_taken(slug, None))
    }

    async fn list_statuses(&self) -> CoreResult<Vec<TaskStatus>> {
        Ok(self.tables.read().await.statuses.values().cloned().collect())
    }

    async fn insert_status(&self, data: CreateTaskStatus) -> CoreResult<TaskStatus> {
        let mut tables = self.tables.write().await;

        if tables.slug_taken(&data.slug, None) {
            return Err(CoreError::DuplicateKey {
                entity: EntityKind::TaskStatus,
                field: "slug",
                value: data.slug,
            });
        }

        let status = TaskStatus {
            id: next_id(&mut tables.next_status_id),
            name: data.name,
            slug: data.slug,
            created_at: Utc::now(),
        };
        tables.statuses.insert(status.id, status.clone());

        Ok(status)
    }

    async fn update_status(&self, status: &TaskStatus) -> CoreResult<Option<TaskStatus>> {
        let mut tables = self.tables.write().await;

        if !tables.statuses.contains_key(&status.id) {
            return Ok(None);
        }
        if tables.slug_taken(&status.slug, Some(status.id)) {
            return Err(CoreError::DuplicateKey {
                entity: EntityKind::TaskStatus,
                field: "slug",
                value: status.slug.clone(),
            });
        }

        tables.statuses.insert(status.id, status.clone());
        Ok(Some(status.clone()))
    }

    async fn delete_status(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.tasks.values().any(|t| t.task_status_id == id) {
            return Err(CoreError::InUse {
                entity: EntityKind::TaskStatus,
                id,
            });
        }

        Ok(tables.statuses.remove(&id).is_some())
    }

    async fn count_tasks_with_status(&self, status_id: i64) -> CoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .tasks
            .values()
            .filter(|t| t.task_status_id == status_id)
            .count();

        Ok(count as i64)
    }

    async fn find_label(&self, id: i64) -> CoreResult<Option<Label>> {
        Ok(self.tables.read().await.labels.get(&id).cloned())
    }

    async fn label_exists_by_name(&self, name: &str) -> CoreResult<bool> {
        Ok(self.tables.read().await.label_name_taken(name, None))
    }

    async fn list_labels(&self) -> CoreResult<Vec<Label>> {
        Ok(self.tables.read().await.labels.values().cloned().collect())
    }

    async fn insert_label(&self, data: CreateLabel) -> CoreResult<Label> {
        let mut tables = self.tables.write().await;

        if tables.label_name_taken(&data.name, None) {
            return Err(CoreError::DuplicateKey {
                entity: EntityKind::Label,
                field: "name",
                value: data.name,
            });
        }

        let label = Label {
            id: next_id(&mut tables.next_label_id),
            name: data.name,
            created_at: Utc::now(),
        };
        tables.labels.insert(label.id, label.clone());

        Ok(label)
    }

    async fn update_label(&self, label: &Label) -> CoreResult<Option<Label>> {
        let mut tables = self.tables.write().await;

        if !tables.labels.contains_key(&label.id) {
            return Ok(None);
        }
        if tables.label_name_taken(&label.name, Some(label.id)) {
            return Err(CoreError::DuplicateKey {
                entity: EntityKind::Label,
                field: "name",
                value: label.name.clone(),
            });
        }

        tables.labels.insert(label.id, label.clone());
        Ok(Some(label.clone()))
    }

    async fn delete_label(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.labels.remove(&id).is_none() {
            return Ok(false);
        }
        tables.task_labels.retain(|&(_, label_id)| label_id != id);

        Ok(true)
    }

    async fn find_task(&self, id: i64) -> CoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).map(|record| tables.hydrate(record)))
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> CoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let tasks = tables.tasks.values().map(|record| tables.hydrate(record));

        Ok(filter.apply(tasks))
    }

    async fn insert_task(&self, data: NewTask) -> CoreResult<Task> {
        let mut tables = self.tables.write().await;
        tables.check_task_references(data.task_status_id, data.assignee_id, &data.label_ids)?;

        let record = TaskRecord {
            id: next_id(&mut tables.next_task_id),
            index: data.index,
            assignee_id: data.assignee_id,
            name: data.name,
            description: data.description,
            task_status_id: data.task_status_id,
            created_at: Utc::now(),
        };
        tables.link_task(record.id, &data.label_ids);
        let task = tables.hydrate(&record);
        tables.tasks.insert(record.id, record);

        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> CoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        let Some(created_at) = tables.tasks.get(&task.id).map(|r| r.created_at) else {
            return Ok(None);
        };
        tables.check_task_references(task.task_status_id, task.assignee_id, &task.label_ids)?;

        let record = TaskRecord {
            id: task.id,
            index: task.index,
            assignee_id: task.assignee_id,
            name: task.name.clone(),
            description: task.description.clone(),
            task_status_id: task.task_status_id,
            created_at,
        };
        tables.unlink_task(task.id);
        tables.link_task(task.id, &task.label_ids);
        let updated = tables.hydrate(&record);
        tables.tasks.insert(task.id, record);

        Ok(Some(updated))
    }

    async fn delete_task(&self, id: i64) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        tables.unlink_task(id);

        Ok(true)
    }

    async fn health_check(&self) -> CoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status(store: &MemoryStore, slug: &str) -> TaskStatus {
        store
            .insert_status(CreateTaskStatus {
                name: slug.to_string(),
                slug: slug.to_string(),
            })
            .await
            .unwrap()
    }

    async fn label(store: &MemoryStore, name: &str) -> Label {
        store
            .insert_label(CreateLabel {
                name: name.to_string(),
            })
            .await
            .unwrap()
    }

    async fn user(store: &MemoryStore, email: &str) -> User {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                first_name: None,
                last_name: None,
                password_digest: "digest".to_string(),
            })
            .await
            .unwrap()
    }

    fn new_task(name: &str, status_id: i64, labels: &[i64]) -> NewTask {
        NewTask {
            index: None,
            assignee_id: None,
            name: name.to_string(),
            description: None,
            task_status_id: status_id,
            label_ids: labels.iter().copied().collect(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let store = MemoryStore::new();

        assert_eq!(status(&store, "draft").await.id, 1);
        assert_eq!(status(&store, "published").await.id, 2);
        assert_eq!(label(&store, "bug").await.id, 1);
    }

    #[tokio::test]
    async fn test_insert_task_hydrates_status_and_labels() {
        let store = MemoryStore::new();
        let draft = status(&store, "draft").await;
        let bug = label(&store, "bug").await;

        let task = store.insert_task(new_task("Fix login bug", draft.id, &[bug.id])).await.unwrap();

        assert_eq!(task.status_slug, "draft");
        assert_eq!(task.label_ids, BTreeSet::from([bug.id]));
        assert_eq!(store.find_task(task.id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn test_insert_task_checks_references() {
        let store = MemoryStore::new();
        let draft = status(&store, "draft").await;

        let err = store.insert_task(new_task("Dangling", 42, &[])).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: EntityKind::TaskStatus, .. }));

        let err = store.insert_task(new_task("Dangling", draft.id, &[9])).await.unwrap_err();
        assert_eq!(err.not_found_key(), Some("9"));
        assert!(store.list_tasks(&TaskFilter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_rename_shows_on_tasks() {
        let store = MemoryStore::new();
        let mut draft = status(&store, "draft").await;
        let task = store.insert_task(new_task("Write docs", draft.id, &[])).await.unwrap();

        draft.slug = "backlog".to_string();
        store.update_status(&draft).await.unwrap();

        let reloaded = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status_slug, "backlog");
    }

    #[tokio::test]
    async fn test_delete_label_detaches_from_tasks() {
        let store = MemoryStore::new();
        let draft = status(&store, "draft").await;
        let bug = label(&store, "bug").await;
        let feature = label(&store, "feature").await;
        let task = store
            .insert_task(new_task("Fix login bug", draft.id, &[bug.id, feature.id]))
            .await
            .unwrap();

        assert!(store.delete_label(bug.id).await.unwrap());
        assert!(!store.delete_label(bug.id).await.unwrap());

        let reloaded = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(reloaded.label_ids, BTreeSet::from([feature.id]));
    }

    #[tokio::test]
    async fn test_delete_user_unassigns_tasks() {
        let store = MemoryStore::new();
        let draft = status(&store, "draft").await;
        let jane = user(&store, "jane@example.com").await;
        let mut data = new_task("Fix login bug", draft.id, &[]);
        data.assignee_id = Some(jane.id);
        let task = store.insert_task(data).await.unwrap();

        assert!(store.delete_user(jane.id).await.unwrap());
        assert!(!store.delete_user(jane.id).await.unwrap());

        let reloaded = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(reloaded.assignee_id, None);
    }

    #[tokio::test]
    async fn test_delete_status_in_use_is_refused() {
        let store = MemoryStore::new();
        let draft = status(&store, "draft").await;
        let task = store.insert_task(new_task("Write docs", draft.id, &[])).await.unwrap();

        assert_eq!(store.count_tasks_with_status(draft.id).await.unwrap(), 1);
        assert!(matches!(
            store.delete_status(draft.id).await,
            Err(CoreError::InUse { id, .. }) if id == draft.id
        ));

        assert!(store.delete_task(task.id).await.unwrap());
        assert!(store.delete_status(draft.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unique_keys() {
        let store = MemoryStore::new();
        user(&store, "jane@example.com").await;
        label(&store, "bug").await;
        status(&store, "draft").await;

        assert!(store.user_exists_by_email("jane@example.com").await.unwrap());
        assert!(!store.user_exists_by_email("JANE@example.com").await.unwrap());
        assert!(matches!(
            store.insert_label(CreateLabel { name: "bug".to_string() }).await,
            Err(CoreError::DuplicateKey { field: "name", .. })
        ));
        assert!(matches!(
            store
                .insert_status(CreateTaskStatus {
                    name: "Other".to_string(),
                    slug: "draft".to_string()
                })
                .await,
            Err(CoreError::DuplicateKey { field: "slug", .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_rows() {
        let store = MemoryStore::new();
        let draft = status(&store, "draft").await;
        let task = store.insert_task(new_task("Write docs", draft.id, &[])).await.unwrap();
        store.delete_task(task.id).await.unwrap();

        assert_eq!(store.update_task(&task).await.unwrap(), None);
        assert_eq!(store.find_task(task.id).await.unwrap(), None);
    }
}
