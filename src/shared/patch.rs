use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────
// PatchField (explicit PATCH semantics)
// ──────────────────────────────────────────────────────────
// - Unset: field not provided => keep stored value
// - Null: explicitly null => clear the column (nullable fields only)
// - Value(v): replace with v
//
// Request DTOs mark these fields with #[serde(default)] so an omitted
// key deserializes to Unset.
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchField<T> {
    #[serde(skip)]
    Unset,
    Null,
    Value(T),
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        PatchField::Unset
    }
}

impl<T> PatchField<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, PatchField::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PatchField::Null)
    }

    pub fn as_value(&self) -> Option<&T> {
        if let PatchField::Value(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PatchField<U> {
        match self {
            PatchField::Unset => PatchField::Unset,
            PatchField::Null => PatchField::Null,
            PatchField::Value(v) => PatchField::Value(f(v)),
        }
    }

    /// `Unset` -> `None`, `Null` -> `Some(None)`, `Value(v)` -> `Some(Some(v))`.
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            PatchField::Unset => None,
            PatchField::Null => Some(None),
            PatchField::Value(v) => Some(Some(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        description: PatchField<String>,
    }

    #[test]
    fn omitted_key_is_unset() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.description.is_unset());
        assert_eq!(body.description.into_update(), None);
    }

    #[test]
    fn explicit_null_is_null() {
        let body: Body = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert!(body.description.is_null());
        assert_eq!(body.description.into_update(), Some(None));
    }

    #[test]
    fn value_is_value() {
        let body: Body = serde_json::from_str(r#"{"description":"A novel"}"#).unwrap();
        assert_eq!(body.description.as_value().map(String::as_str), Some("A novel"));
        assert_eq!(
            body.description.map(|s| s.len()).into_update(),
            Some(Some(7))
        );
    }
}
