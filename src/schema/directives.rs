use super::types::{FieldOptions, Schema};
use std::collections::BTreeSet;

/// The fixed directive vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Dedupe,
    DedupeWith,
    Distinct,
    Accumulate,
    Merge,
}

impl FieldOptions {
    /// Whether this field declares the given directive.
    pub fn declares(&self, directive: Directive) -> bool {
        match directive {
            Directive::Dedupe => self.dedupe,
            Directive::DedupeWith => self.dedupe_with,
            Directive::Distinct => self.distinct,
            Directive::Accumulate => self.accumulate,
            Directive::Merge => self.merge,
        }
    }
}

/// Every distinct field name carrying `directive`, across the base schema
/// and all discriminator variants.
///
/// Variants may introduce directive-bearing fields the base schema lacks, so
/// their field sets are visited in addition to the base set. The result is a
/// set: a field redeclared by several variants appears once. A schema with
/// no variants behaves identically to one with an empty variant set.
pub fn directive_fields(schema: &Schema, directive: Directive) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();

    for variant in schema.discriminators().values() {
        collect(variant, directive, &mut fields);
    }
    collect(schema, directive, &mut fields);

    fields
}

fn collect(schema: &Schema, directive: Directive, into: &mut BTreeSet<String>) {
    for (name, options) in schema.fields() {
        if options.declares(directive) {
            into.insert(name.clone());
        }
    }
}

/// Directive lookup table computed once at schema registration.
///
/// Avoids walking the schema on every write; the schema owns its table and
/// the table is immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveTable {
    dedupe: BTreeSet<String>,
    dedupe_with: BTreeSet<String>,
    distinct: BTreeSet<String>,
    accumulate: BTreeSet<String>,
    merge: BTreeSet<String>,
}

impl DirectiveTable {
    pub fn build(schema: &Schema) -> Self {
        Self {
            dedupe: directive_fields(schema, Directive::Dedupe),
            dedupe_with: directive_fields(schema, Directive::DedupeWith),
            distinct: directive_fields(schema, Directive::Distinct),
            accumulate: directive_fields(schema, Directive::Accumulate),
            merge: directive_fields(schema, Directive::Merge),
        }
    }

    pub fn get(&self, directive: Directive) -> &BTreeSet<String> {
        match directive {
            Directive::Dedupe => &self.dedupe,
            Directive::DedupeWith => &self.dedupe_with,
            Directive::Distinct => &self.distinct,
            Directive::Accumulate => &self.accumulate,
            Directive::Merge => &self.merge,
        }
    }
}
