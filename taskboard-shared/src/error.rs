/// Error types shared by the resolver, merger, services and stores
///
/// Every failure the core can produce is one of the variants of [`CoreError`].
/// Callers (the HTTP layer) map the variants to transport-level responses;
/// nothing in this crate retries or swallows an error.
///
/// # Taxonomy
///
/// - `NotFound`: a referenced entity (status slug, label id, assignee id) or the
///   entity being read/updated/deleted does not exist
/// - `ValidationFailed`: the payload violates a declared constraint; detected
///   before any mutation
/// - `DuplicateKey`: a unique key (slug, label name, email) is already taken;
///   checked explicitly before the write
/// - `InUse`: a delete was refused because tasks still reference the row
/// - `Storage`: opaque storage failure, propagated as-is

use crate::auth::password::PasswordError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result alias used throughout the shared crate
pub type CoreResult<T> = Result<T, CoreError>;

/// Kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    TaskStatus,
    Label,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::TaskStatus => "task status",
            EntityKind::Label => "label",
            EntityKind::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed constraint on a request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Wire name of the field
    pub field: String,

    /// Human-readable explanation
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Referenced or target entity does not exist
    ///
    /// `key` carries the offending slug or id so callers can render a precise message.
    #[error("{entity} not found: {key}")]
    NotFound { entity: EntityKind, key: String },

    /// Payload violates one or more declared constraints
    #[error("validation failed: {} violation(s)", .0.len())]
    ValidationFailed(Vec<FieldViolation>),

    /// A unique key is already taken
    #[error("{entity} with {field} '{value}' already exists")]
    DuplicateKey {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },

    /// Delete refused because other rows still reference this one
    #[error("{entity} {id} is still referenced by existing tasks")]
    InUse { entity: EntityKind, id: i64 },

    /// Storage collaborator failure (connectivity, timeout, ...)
    #[error("storage failure: {0}")]
    Storage(#[source] sqlx::Error),

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl CoreError {
    /// Builds a `NotFound` error for the given entity and key
    pub fn not_found(entity: EntityKind, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Returns the identifying key if this is a `NotFound` error
    pub fn not_found_key(&self) -> Option<&str> {
        match self {
            CoreError::NotFound { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Convert storage errors
///
/// Uniqueness and referential checks happen explicitly before writes, so any
/// constraint violation reaching this point is a race and stays opaque.
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Storage(err)
    }
}

/// Convert `validator` derive output into field violations
impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldViolation::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        CoreError::ValidationFailed(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = CoreError::not_found(EntityKind::TaskStatus, "nonexistent-slug");
        assert_eq!(err.to_string(), "task status not found: nonexistent-slug");
        assert_eq!(err.not_found_key(), Some("nonexistent-slug"));
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = CoreError::DuplicateKey {
            entity: EntityKind::Label,
            field: "name",
            value: "bug".to_string(),
        };
        assert_eq!(err.to_string(), "label with name 'bug' already exists");
        assert!(err.not_found_key().is_none());
    }

    #[test]
    fn test_validation_failed_display() {
        let err = CoreError::ValidationFailed(vec![
            FieldViolation::new("title", "must not be null"),
            FieldViolation::new("status", "must not be null"),
        ]);
        assert_eq!(err.to_string(), "validation failed: 2 violation(s)");
    }

    #[test]
    fn test_from_validation_errors() {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("length");
        error.message = Some("Name is too short".into());
        errors.add("name", error);

        match CoreError::from(errors) {
            CoreError::ValidationFailed(violations) => {
                assert_eq!(violations, vec![FieldViolation::new("name", "Name is too short")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
