/// Tri-state field wrapper for partial updates
///
/// An update payload distinguishes three states per field:
///
/// ```text
/// {}                      -> Patch::Unset      (leave the stored value alone)
/// { "content": null }     -> Patch::Clear      (clear, or reject if non-nullable)
/// { "content": "text" }   -> Patch::Set("text") (overwrite)
/// ```
///
/// Decoding relies on `#[serde(default)]` on the containing struct: a missing
/// key never reaches the deserializer and falls back to `Unset`, while a
/// present key is decoded as `Option<T>` and mapped to `Clear` or `Set`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use taskboard_shared::patch::Patch;
///
/// #[derive(Deserialize)]
/// struct Update {
///     #[serde(default)]
///     content: Patch<String>,
/// }
///
/// let absent: Update = serde_json::from_str("{}").unwrap();
/// assert!(absent.content.is_unset());
///
/// let cleared: Update = serde_json::from_str(r#"{"content":null}"#).unwrap();
/// assert!(cleared.content.is_clear());
/// ```

use serde::{Deserialize, Deserializer};
use validator::{ValidateEmail, ValidationError, ValidationErrors};

/// Field state in an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent from the payload
    Unset,

    /// Field present as `null`
    Clear,

    /// Field present with a value
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Patch::Clear)
    }

    /// Fallible map, used when a set value must first be resolved
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Unset => Patch::Unset,
            Patch::Clear => Patch::Clear,
            Patch::Set(value) => Patch::Set(f(value)?),
        })
    }

    /// Writes the patch into a nullable slot
    ///
    /// `Unset` leaves the slot alone, `Clear` empties it, `Set` overwrites it.
    pub fn apply_to_option(self, slot: &mut Option<T>) {
        match self {
            Patch::Unset => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }

    /// Writes the patch into a non-nullable slot
    ///
    /// `Clear` must have been rejected during validation; it is treated like
    /// `Unset` here so that applying never fails.
    pub fn apply_to(self, slot: &mut T) {
        if let Patch::Set(value) = self {
            *slot = value;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

fn violation(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Records a violation when a non-nullable field is sent as `null`
pub fn reject_null<T>(errors: &mut ValidationErrors, field: &'static str, patch: &Patch<T>) {
    if patch.is_clear() {
        errors.add(field, violation("required", format!("{field} must not be null")));
    }
}

/// Records a violation when a string is blank
pub fn require_not_blank(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, violation("blank", format!("{field} must not be blank")));
    }
}

/// Records a violation when a set string is blank
pub fn check_not_blank(errors: &mut ValidationErrors, field: &'static str, patch: &Patch<String>) {
    if let Patch::Set(value) = patch {
        require_not_blank(errors, field, value);
    }
}

/// Records a violation when a string falls outside `min..=max` characters
pub fn require_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.add(
            field,
            violation("length", format!("{field} must be {min}-{max} characters")),
        );
    }
}

/// Records a violation when a set string falls outside `min..=max` characters
pub fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    patch: &Patch<String>,
    min: usize,
    max: usize,
) {
    if let Patch::Set(value) = patch {
        require_length(errors, field, value, min, max);
    }
}

/// Records a violation when a set string is not an email address
pub fn check_email(errors: &mut ValidationErrors, field: &'static str, patch: &Patch<String>) {
    if let Patch::Set(value) = patch {
        if !value.validate_email() {
            errors.add(field, violation("email", "Invalid email format".to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Patch<String>,

        #[serde(default)]
        ids: Patch<Vec<i64>>,
    }

    #[test]
    fn test_absent_field_is_unset() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert!(payload.name.is_unset());
        assert!(payload.ids.is_unset());
    }

    #[test]
    fn test_null_field_is_clear() {
        let payload: Payload = serde_json::from_str(r#"{"name": null, "ids": null}"#).unwrap();
        assert!(payload.name.is_clear());
        assert!(payload.ids.is_clear());
    }

    #[test]
    fn test_value_field_is_set() {
        let payload: Payload =
            serde_json::from_str(r#"{"name": "Fix login bug", "ids": [1, 2]}"#).unwrap();
        assert_eq!(payload.name, Patch::Set("Fix login bug".to_string()));
        assert_eq!(payload.ids, Patch::Set(vec![1, 2]));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result: Result<Payload, _> = serde_json::from_str(r#"{"ids": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_to_option() {
        let mut slot = Some("old".to_string());
        Patch::Unset.apply_to_option(&mut slot);
        assert_eq!(slot.as_deref(), Some("old"));

        Patch::Set("new".to_string()).apply_to_option(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));

        Patch::Clear.apply_to_option(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn test_apply_to_required_slot_ignores_clear() {
        let mut slot = "kept".to_string();
        Patch::Clear.apply_to(&mut slot);
        assert_eq!(slot, "kept");

        Patch::Set("replaced".to_string()).apply_to(&mut slot);
        assert_eq!(slot, "replaced");
    }

    #[test]
    fn test_rules_only_inspect_present_fields() {
        let mut errors = ValidationErrors::new();
        reject_null(&mut errors, "title", &Patch::<String>::Unset);
        check_not_blank(&mut errors, "title", &Patch::Clear);
        check_length(&mut errors, "name", &Patch::Unset, 3, 1000);
        check_email(&mut errors, "email", &Patch::Clear);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_rules_report_each_field() {
        let mut errors = ValidationErrors::new();
        reject_null(&mut errors, "title", &Patch::<String>::Clear);
        check_not_blank(&mut errors, "status", &Patch::Set("   ".to_string()));
        check_length(&mut errors, "name", &Patch::Set("ab".to_string()), 3, 1000);
        check_email(&mut errors, "email", &Patch::Set("nope".to_string()));

        let fields = errors.field_errors();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("status"));
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_try_map_propagates_error() {
        let patch: Patch<i64> = Patch::Set(7);
        let result: Result<Patch<i64>, &str> = patch.try_map(|_| Err("missing"));
        assert_eq!(result, Err("missing"));

        let unset: Patch<i64> = Patch::Unset;
        let result: Result<Patch<i64>, &str> = unset.try_map(|_| Err("never called"));
        assert_eq!(result, Ok(Patch::Unset));
    }
}
