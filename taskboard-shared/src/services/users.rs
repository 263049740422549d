/// User service
///
/// Registration and password changes hash with Argon2id before anything is
/// stored; [`authenticate`] is the only place a plaintext password is compared.

use crate::auth::password::verify_password;
use crate::error::{CoreError, CoreResult, EntityKind};
use crate::merge::{merge_user, prepare_user};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::store::Store;
use tracing::{info, warn};

pub async fn list(store: &dyn Store) -> CoreResult<Vec<User>> {
    store.list_users().await
}

pub async fn get(store: &dyn Store, id: i64) -> CoreResult<User> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::User, id))
}

pub async fn create(store: &dyn Store, data: CreateUser) -> CoreResult<User> {
    let new_user = prepare_user(store, data).await?;
    let user = store.insert_user(new_user).await?;

    info!(user_id = user.id, email = %user.email, "User registered");
    Ok(user)
}

pub async fn update(store: &dyn Store, id: i64, update: UpdateUser) -> CoreResult<User> {
    let mut user = get(store, id).await?;
    merge_user(store, &mut user, update).await?;

    let user = store
        .update_user(&user)
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::User, id))?;

    info!(user_id = user.id, "User updated");
    Ok(user)
}

/// Deletes a user; their tasks become unassigned
pub async fn delete(store: &dyn Store, id: i64) -> CoreResult<()> {
    if !store.delete_user(id).await? {
        return Err(CoreError::not_found(EntityKind::User, id));
    }
    info!(user_id = id, "User deleted");
    Ok(())
}

/// Checks login credentials
///
/// Returns `None` for an unknown email or a wrong password, without telling
/// the two apart.
pub async fn authenticate(store: &dyn Store, email: &str, password: &str) -> CoreResult<Option<User>> {
    let Some(user) = store.find_user_by_email(email).await? else {
        warn!(email = %email, "Login attempt for unknown email");
        return Ok(None);
    };

    if !verify_password(password, &user.password_digest)? {
        warn!(user_id = user.id, "Login attempt with wrong password");
        return Ok(None);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use crate::models::task_status::CreateTaskStatus;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::collections::BTreeSet;

    async fn register(store: &MemoryStore, email: &str, password: &str) -> User {
        let data: CreateUser = serde_json::from_value(json!({
            "email": email,
            "firstName": "Jane",
            "password": password
        }))
        .unwrap();
        create(store, data).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let store = MemoryStore::new();
        let user = register(&store, "jane@example.com", "qwerty").await;
        assert_ne!(user.password_digest, "qwerty");

        let found = authenticate(&store, "jane@example.com", "qwerty").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(authenticate(&store, "jane@example.com", "wrong").await.unwrap().is_none());
        assert!(authenticate(&store, "nobody@example.com", "qwerty").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let store = MemoryStore::new();
        register(&store, "jane@example.com", "qwerty").await;

        let data: CreateUser = serde_json::from_value(json!({
            "email": "jane@example.com",
            "password": "other"
        }))
        .unwrap();
        assert!(matches!(
            create(&store, data).await,
            Err(CoreError::DuplicateKey { entity: EntityKind::User, field: "email", .. })
        ));
    }

    #[tokio::test]
    async fn test_password_change_takes_effect() {
        let store = MemoryStore::new();
        let user = register(&store, "jane@example.com", "qwerty").await;

        let payload: UpdateUser = serde_json::from_value(json!({ "password": "new-secret" })).unwrap();
        update(&store, user.id, payload).await.unwrap();

        assert!(authenticate(&store, "jane@example.com", "qwerty").await.unwrap().is_none());
        assert!(authenticate(&store, "jane@example.com", "new-secret").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unassigns_tasks() {
        let store = MemoryStore::new();
        let user = register(&store, "jane@example.com", "qwerty").await;
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
                assignee_id: Some(user.id),
                name: "Fix login bug".to_string(),
                description: None,
                task_status_id: status.id,
                label_ids: BTreeSet::new(),
            })
            .await
            .unwrap();

        delete(&store, user.id).await.unwrap();

        assert!(store.find_task(task.id).await.unwrap().unwrap().assignee_id.is_none());
        assert!(matches!(get(&store, user.id).await, Err(CoreError::NotFound { .. })));
    }
}
