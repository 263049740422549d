/// Reference resolution
///
/// Requests name related rows by external keys: a status by slug, labels and
/// the assignee by id. [`ReferenceResolver`] turns those keys into rows or
/// fails with `NotFound` carrying the offending key.
///
/// Every call is a fresh read through the [`Store`]; nothing is cached and
/// nothing is written.
///
/// # Example
///
/// ```
/// use taskboard_shared::error::CoreError;
/// use taskboard_shared::resolver::ReferenceResolver;
/// use taskboard_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let resolver = ReferenceResolver::new(&store);
///
/// let err = resolver.resolve_status("nonexistent-slug").await.unwrap_err();
/// assert_eq!(err.not_found_key(), Some("nonexistent-slug"));
///
/// assert!(resolver.resolve_assignee(None).await?.is_none());
/// # Ok(())
/// # }
/// ```

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::models::label::Label;
use crate::models::task_status::TaskStatus;
use crate::models::user::User;
use crate::store::Store;
use std::collections::BTreeSet;

/// Resolves external keys against a store
#[derive(Clone, Copy)]
pub struct ReferenceResolver<'a> {
    store: &'a dyn Store,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Status by slug
    pub async fn resolve_status(&self, slug: &str) -> CoreResult<TaskStatus> {
        self.store
            .find_status_by_slug(slug)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::TaskStatus, slug))
    }

    /// Labels by id
    ///
    /// Duplicate ids collapse; the result is ordered by id. The first id in
    /// input order that does not resolve fails the whole call.
    pub async fn resolve_labels(&self, ids: &[i64]) -> CoreResult<Vec<Label>> {
        let mut seen = BTreeSet::new();
        let mut labels = Vec::with_capacity(ids.len());

        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            let label = self
                .store
                .find_label(id)
                .await?
                .ok_or_else(|| CoreError::not_found(EntityKind::Label, id))?;
            labels.push(label);
        }

        labels.sort_by_key(|l| l.id);
        Ok(labels)
    }

    /// Label ids as a set, after checking every one exists
    pub async fn resolve_label_ids(&self, ids: &[i64]) -> CoreResult<BTreeSet<i64>> {
        let labels = self.resolve_labels(ids).await?;
        Ok(labels.into_iter().map(|l| l.id).collect())
    }

    /// User by id
    pub async fn resolve_user(&self, id: i64) -> CoreResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::User, id))
    }

    /// Optional assignee; `None` means unassigned and is not an error
    pub async fn resolve_assignee(&self, id: Option<i64>) -> CoreResult<Option<User>> {
        match id {
            Some(id) => self.resolve_user(id).await.map(Some),
            None => Ok(None),
        }
    }
}
