/// Partial-update merging and create preparation
///
/// An update runs in three phases:
///
/// 1. **validate**: every field of the payload is checked; explicit `null`
///    on a non-nullable field and constraint violations are all reported at
///    once as `ValidationFailed`
/// 2. **resolve**: every `Set` reference (status slug, assignee id, label
///    ids) goes through the [`ReferenceResolver`], changed unique keys are
///    checked, passwords are hashed
/// 3. **apply**: the resolved changes are written onto the entity
///
/// Phases 1 and 2 only read. Phase 3 cannot fail, so an error anywhere leaves
/// the entity exactly as it was.
///
/// Creates follow phases 1 and 2 and produce the insert data for the store.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::merge::merge_task;
/// use taskboard_shared::models::task::UpdateTask;
/// use taskboard_shared::store::{MemoryStore, Store};
///
/// # async fn example(store: MemoryStore) -> Result<(), Box<dyn std::error::Error>> {
/// let mut task = store.find_task(1).await?.ok_or("missing")?;
/// let update: UpdateTask = serde_json::from_str(r#"{"status":"published","content":null}"#)?;
///
/// merge_task(&store, &mut task, update).await?;
/// store.update_task(&task).await?;
/// # Ok(())
/// # }
/// ```

use crate::auth::password::hash_password;
use crate::error::{CoreError, CoreResult, EntityKind};
use crate::models::label::{CreateLabel, Label, UpdateLabel};
use crate::models::task::{CreateTask, NewTask, Task, UpdateTask};
use crate::models::task_status::{CreateTaskStatus, TaskStatus, UpdateTaskStatus};
use crate::models::user::{CreateUser, NewUser, UpdateUser, User};
use crate::patch::Patch;
use crate::resolver::ReferenceResolver;
use crate::store::Store;
use std::collections::BTreeSet;
use validator::Validate;

/// Resolved task changes, ready to apply
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub index: Patch<i32>,
    pub assignee_id: Patch<i64>,
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub status: Patch<TaskStatus>,
    pub label_ids: Patch<BTreeSet<i64>>,
}

impl TaskChanges {
    pub fn apply(self, task: &mut Task) {
        self.index.apply_to_option(&mut task.index);
        self.assignee_id.apply_to_option(&mut task.assignee_id);
        self.name.apply_to(&mut task.name);
        self.description.apply_to_option(&mut task.description);

        if let Patch::Set(status) = self.status {
            task.task_status_id = status.id;
            task.status_slug = status.slug;
        }

        match self.label_ids {
            Patch::Unset => {}
            Patch::Clear => task.label_ids.clear(),
            Patch::Set(ids) => task.label_ids = ids,
        }
    }
}

/// Validates a task update and resolves its references
pub async fn resolve_task_update(store: &dyn Store, update: UpdateTask) -> CoreResult<TaskChanges> {
    update.validate()?;
    let resolver = ReferenceResolver::new(store);

    let status = match update.status {
        Patch::Set(slug) => Patch::Set(resolver.resolve_status(&slug).await?),
        Patch::Clear => Patch::Clear,
        Patch::Unset => Patch::Unset,
    };

    if let Patch::Set(user_id) = update.assignee_id {
        resolver.resolve_user(user_id).await?;
    }

    let label_ids = match update.label_ids {
        Patch::Set(ids) => Patch::Set(resolver.resolve_label_ids(&ids).await?),
        Patch::Clear => Patch::Clear,
        Patch::Unset => Patch::Unset,
    };

    Ok(TaskChanges {
        index: update.index,
        assignee_id: update.assignee_id,
        name: update.name,
        description: update.description,
        status,
        label_ids,
    })
}

/// Merges an update payload into `task`
///
/// On error `task` is untouched.
pub async fn merge_task(store: &dyn Store, task: &mut Task, update: UpdateTask) -> CoreResult<()> {
    let changes = resolve_task_update(store, update).await?;
    changes.apply(task);
    Ok(())
}

/// Validates a create payload and resolves it into insert data
pub async fn prepare_task(store: &dyn Store, data: CreateTask) -> CoreResult<NewTask> {
    data.validate()?;
    let resolver = ReferenceResolver::new(store);

    let status = resolver.resolve_status(&data.status).await?;
    let assignee = resolver.resolve_assignee(data.assignee_id).await?;
    let label_ids = match data.label_ids {
        Some(ids) => resolver.resolve_label_ids(&ids).await?,
        None => BTreeSet::new(),
    };

    Ok(NewTask {
        index: data.index,
        assignee_id: assignee.map(|u| u.id),
        name: data.name,
        description: data.description,
        task_status_id: status.id,
        label_ids,
    })
}

/// Resolved user changes; the password is already a digest
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Patch<String>,
    pub first_name: Patch<String>,
    pub last_name: Patch<String>,
    pub password_digest: Patch<String>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User) {
        self.email.apply_to(&mut user.email);
        self.first_name.apply_to_option(&mut user.first_name);
        self.last_name.apply_to_option(&mut user.last_name);
        self.password_digest.apply_to(&mut user.password_digest);
    }
}

async fn ensure_email_free(store: &dyn Store, email: &str) -> CoreResult<()> {
    if store.user_exists_by_email(email).await? {
        return Err(CoreError::DuplicateKey {
            entity: EntityKind::User,
            field: "email",
            value: email.to_string(),
        });
    }
    Ok(())
}

/// Validates a user update, checks a changed email and hashes a new password
pub async fn resolve_user_update(
    store: &dyn Store,
    user: &User,
    update: UpdateUser,
) -> CoreResult<UserChanges> {
    update.validate()?;

    if let Patch::Set(email) = &update.email {
        if *email != user.email {
            ensure_email_free(store, email).await?;
        }
    }

    let password_digest = update.password.try_map(|plain| hash_password(&plain))?;

    Ok(UserChanges {
        email: update.email,
        first_name: update.first_name,
        last_name: update.last_name,
        password_digest,
    })
}

/// Merges an update payload into `user`
pub async fn merge_user(store: &dyn Store, user: &mut User, update: UpdateUser) -> CoreResult<()> {
    let changes = resolve_user_update(store, user, update).await?;
    changes.apply(user);
    Ok(())
}

/// Validates a registration, checks the email and hashes the password
pub async fn prepare_user(store: &dyn Store, data: CreateUser) -> CoreResult<NewUser> {
    data.validate()?;
    ensure_email_free(store, &data.email).await?;

    Ok(NewUser {
        password_digest: hash_password(&data.password)?,
        email: data.email,
        first_name: data.first_name,
        last_name: data.last_name,
    })
}

async fn ensure_slug_free(store: &dyn Store, slug: &str) -> CoreResult<()> {
    if store.status_exists_by_slug(slug).await? {
        return Err(CoreError::DuplicateKey {
            entity: EntityKind::TaskStatus,
            field: "slug",
            value: slug.to_string(),
        });
    }
    Ok(())
}

/// Merges an update payload into `status`
pub async fn merge_status(
    store: &dyn Store,
    status: &mut TaskStatus,
    update: UpdateTaskStatus,
) -> CoreResult<()> {
    update.validate()?;

    if let Patch::Set(slug) = &update.slug {
        if *slug != status.slug {
            ensure_slug_free(store, slug).await?;
        }
    }

    update.name.apply_to(&mut status.name);
    update.slug.apply_to(&mut status.slug);
    Ok(())
}

/// Validates a new status and checks its slug
pub async fn prepare_status(store: &dyn Store, data: CreateTaskStatus) -> CoreResult<CreateTaskStatus> {
    data.validate()?;
    ensure_slug_free(store, &data.slug).await?;
    Ok(data)
}

async fn ensure_label_name_free(store: &dyn Store, name: &str) -> CoreResult<()> {
    if store.label_exists_by_name(name).await? {
        return Err(CoreError::DuplicateKey {
            entity: EntityKind::Label,
            field: "name",
            value: name.to_string(),
        });
    }
    Ok(())
}

/// Merges an update payload into `label`
pub async fn merge_label(store: &dyn Store, label: &mut Label, update: UpdateLabel) -> CoreResult<()> {
    update.validate()?;

    if let Patch::Set(name) = &update.name {
        if *name != label.name {
            ensure_label_name_free(store, name).await?;
        }
    }

    update.name.apply_to(&mut label.name);
    Ok(())
}

/// Validates a new label and checks its name
pub async fn prepare_label(store: &dyn Store, data: CreateLabel) -> CoreResult<CreateLabel> {
    data.validate()?;
    ensure_label_name_free(store, &data.name).await?;
    Ok(data)
}
