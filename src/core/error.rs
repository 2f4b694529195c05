use crate::storage::StoreError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, GuardError>;

/// Classifies why a field was flagged during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    /// A `dedupe` field value already exists on another document.
    DuplicateField,
    /// The full `dedupe_with` tuple already exists on another document.
    DuplicateJointFields,
    /// A `distinct` array key collided with no accumulate/merge policy.
    UnresolvedArrayDuplicate,
}

impl DuplicateKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::DuplicateField => "Duplicate found",
            Self::DuplicateJointFields => "Duplicate combination found",
            Self::UnresolvedArrayDuplicate => "Duplicate array entry without a merge policy",
        }
    }
}

impl fmt::Display for DuplicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Aggregated validation failure for one persistence attempt.
///
/// Maps every flagged field path to the reason it was flagged. The map is
/// never empty: a write either proceeds with zero flagged conditions or is
/// rejected with the full set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateError {
    pub fields: BTreeMap<String, DuplicateKind>,
}

impl DuplicateError {
    pub fn new(fields: BTreeMap<String, DuplicateKind>) -> Self {
        Self { fields }
    }

    /// Build a failure flagging every field in `fields` with the same kind.
    pub fn uniform<I, S>(fields: I, kind: DuplicateKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|f| (f.into(), kind)).collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn kind_of(&self, field: &str) -> Option<DuplicateKind> {
        self.fields.get(field).copied()
    }
}

impl fmt::Display for DuplicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: ")?;
        let mut first = true;
        for (field, kind) in &self.fields {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} ({})", field, kind.message())?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for DuplicateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_error_display_lists_every_field() {
        let err = DuplicateError::uniform(["age", "color"], DuplicateKind::DuplicateJointFields);
        let rendered = err.to_string();
        assert!(rendered.contains("age"));
        assert!(rendered.contains("color"));
        assert!(rendered.contains("Duplicate combination found"));
    }

    #[test]
    fn test_store_error_passes_through() {
        let err = GuardError::from(StoreError::Backend("connection reset".into()));
        assert_eq!(err.to_string(), "Backend error: connection reset");
    }
}
