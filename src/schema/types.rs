use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-field directive flags.
///
/// The full directive vocabulary recognized by the validation engine.
/// Scalar fields use `dedupe`/`dedupe_with`; fields of array entries use
/// `distinct`/`accumulate`/`merge`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Value must be globally unique on its own.
    #[serde(default)]
    pub dedupe: bool,
    /// Participates in a joint uniqueness tuple with every other
    /// `dedupe_with` field.
    #[serde(default)]
    pub dedupe_with: bool,
    /// Key used to decide which array entries represent the same item.
    #[serde(default)]
    pub distinct: bool,
    /// Numeric field summed across collapsed entries.
    #[serde(default)]
    pub accumulate: bool,
    /// Field whose latest value wins across collapsed entries.
    #[serde(default)]
    pub merge: bool,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dedupe(mut self) -> Self {
        self.dedupe = true;
        self
    }

    pub fn dedupe_with(mut self) -> Self {
        self.dedupe_with = true;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn accumulate(mut self) -> Self {
        self.accumulate = true;
        self
    }

    pub fn merge(mut self) -> Self {
        self.merge = true;
        self
    }
}

/// Declarative description of a collection's documents.
///
/// Fields carry directive flags; array-typed fields may attach one child
/// schema describing their entries; named discriminator variants extend the
/// base field set. Schemas are built at model-definition time and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    collection: String,
    fields: BTreeMap<String, FieldOptions>,
    #[serde(default)]
    child_schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    discriminators: BTreeMap<String, Schema>,
}

impl Schema {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            fields: BTreeMap::new(),
            child_schemas: BTreeMap::new(),
            discriminators: BTreeMap::new(),
        }
    }

    /// Declare a field with its directive flags.
    pub fn field(mut self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.fields.insert(name.into(), options);
        self
    }

    /// Attach the entry schema of an array-typed field.
    pub fn child(mut self, path: impl Into<String>, schema: Schema) -> Self {
        self.child_schemas.insert(path.into(), schema);
        self
    }

    /// Register a named variant extending this schema's field set.
    pub fn discriminator(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.discriminators.insert(name.into(), schema);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldOptions> {
        &self.fields
    }

    pub fn child_schemas(&self) -> &BTreeMap<String, Schema> {
        &self.child_schemas
    }

    pub fn discriminators(&self) -> &BTreeMap<String, Schema> {
        &self.discriminators
    }
}
