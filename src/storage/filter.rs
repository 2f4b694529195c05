use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved field carrying a document's persisted identity.
pub const ID_FIELD: &str = "_id";

/// A single per-field match condition.
///
/// String uniqueness probes use [`Condition::MatchesInsensitive`]: an
/// anchored, full-string, case-insensitive comparison, never a substring
/// search. Everything else matches by strict equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Strict equality against the stored value.
    Equals(Value),
    /// Anchored case-insensitive match for string values.
    MatchesInsensitive(String),
    /// Negated strict equality; a missing field satisfies this.
    NotEquals(Value),
}

impl Condition {
    /// Evaluate the condition against a document's value for the field.
    /// `None` means the field is absent from the document.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Equals(expected) => value == Some(expected),
            Self::MatchesInsensitive(pattern) => match value {
                Some(Value::String(s)) => anchored_case_insensitive(pattern, s),
                _ => false,
            },
            Self::NotEquals(expected) => value != Some(expected),
        }
    }
}

fn anchored_case_insensitive(pattern: &str, candidate: &str) -> bool {
    RegexBuilder::new(&format!("^{}$", regex::escape(pattern)))
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(candidate))
        .unwrap_or(false)
}

/// A conjunction of per-field conditions, the store query unit.
///
/// Field order is not significant; all conditions must hold for a document
/// to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, condition: Condition) {
        self.conditions.insert(field.into(), condition);
    }

    /// Copy every condition of `other` into this filter. Later entries win
    /// on field collisions.
    pub fn extend(&mut self, other: &Filter) {
        for (field, condition) in &other.conditions {
            self.conditions.insert(field.clone(), condition.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.conditions.iter()
    }

    /// True iff every condition holds against the document body.
    pub fn matches(&self, body: &Map<String, Value>) -> bool {
        self.iter()
            .all(|(field, condition)| condition.matches(body.get(field)))
    }
}
