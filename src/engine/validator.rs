use crate::core::{Document, DuplicateError, DuplicateKind, Result};
use crate::engine::consolidate::consolidate;
use crate::engine::probe;
use crate::interface::{CountDocuments, SaveHook};
use crate::schema::{Directive, DirectiveTable, Schema, directive_fields};
use crate::storage::{Condition, Filter, ID_FIELD};
use async_trait::async_trait;
use futures::future;
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Configuration accepted by [`DedupeGuard`].
#[derive(Debug, Clone, PartialEq)]
pub struct DedupeOptions {
    /// Base scope filter merged into every duplicate probe, e.g. restrict
    /// checks to documents where `active` is true.
    pub scope: BTreeMap<String, Value>,
    /// Probe only fields modified in the current attempt. An optimization
    /// to skip pointless queries, never a correctness requirement.
    pub modified_only: bool,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            scope: BTreeMap::new(),
            modified_only: true,
        }
    }
}

impl DedupeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a base scope condition merged into every probe.
    pub fn scope(mut self, field: impl Into<String>, value: Value) -> Self {
        self.scope.insert(field.into(), value);
        self
    }

    /// Probe every directive-bearing field, modified or not.
    pub fn include_unmodified(mut self) -> Self {
        self.modified_only = false;
        self
    }
}

/// Consolidation rules contributed by one array field's child schema.
#[derive(Debug, Clone)]
struct ChildRules {
    path: String,
    distinct: BTreeSet<String>,
    accumulators: BTreeSet<String>,
    mergers: BTreeSet<String>,
}

/// The pre-persistence validation gate.
///
/// Built once per schema at model-definition time; the directive table and
/// child consolidation rules are immutable afterwards. One validation pass
/// runs per write attempt:
///
/// 1. build the scope filter (base scope + self-exclusion for persisted
///    documents),
/// 2. consolidate arrays under their `distinct` keys,
/// 3. probe `dedupe` fields independently and the `dedupe_with` tuple
///    jointly, concurrently,
/// 4. aggregate every flagged condition into a single failure, or proceed.
#[derive(Debug, Clone)]
pub struct DedupeGuard {
    collection: String,
    directives: DirectiveTable,
    children: Vec<ChildRules>,
    options: DedupeOptions,
}

impl DedupeGuard {
    pub fn new(schema: &Schema) -> Self {
        Self::with_options(schema, DedupeOptions::default())
    }

    pub fn with_options(schema: &Schema, options: DedupeOptions) -> Self {
        let children = schema
            .child_schemas()
            .iter()
            .map(|(path, child)| ChildRules {
                path: path.clone(),
                distinct: directive_fields(child, Directive::Distinct),
                accumulators: directive_fields(child, Directive::Accumulate),
                mergers: directive_fields(child, Directive::Merge),
            })
            .filter(|rules| !rules.distinct.is_empty())
            .collect();

        Self {
            collection: schema.collection().to_string(),
            directives: DirectiveTable::build(schema),
            children,
            options,
        }
    }

    /// Scope filter for one attempt: the configured base conditions plus,
    /// for documents with a persisted identity, an exclusion of that
    /// identity so a document never conflicts with its own prior state.
    fn scope_filter(&self, doc: &Document) -> Filter {
        let mut scope = Filter::new();
        for (field, value) in &self.options.scope {
            scope.insert(field.clone(), Condition::Equals(value.clone()));
        }
        if let Some(id) = doc.id() {
            scope.insert(ID_FIELD, Condition::NotEquals(Value::String(id.to_string())));
        }
        scope
    }

    /// Candidate `dedupe` fields for this attempt.
    fn unique_candidates(&self, doc: &Document) -> BTreeSet<String> {
        self.directives
            .get(Directive::Dedupe)
            .iter()
            .filter(|field| !self.options.modified_only || doc.is_modified(field))
            .cloned()
            .collect()
    }

    /// The joint filter, or an empty one when the tuple must not fire.
    ///
    /// The joint check is evaluated as a single combined tuple: it fires
    /// only when every `dedupe_with` field has a value on the document and,
    /// under `modified_only`, at least one of them changed this attempt.
    fn joint_filter(&self, doc: &Document) -> Filter {
        let members = self.directives.get(Directive::DedupeWith);
        if members.is_empty() {
            return Filter::new();
        }
        if self.options.modified_only && !members.iter().any(|field| doc.is_modified(field)) {
            return Filter::new();
        }
        if !members.iter().all(|field| doc.value_of(field).is_some()) {
            return Filter::new();
        }
        probe::field_conditions(doc, members)
    }

    /// Consolidate every array field governed by a child schema, in place.
    /// Returns the distinct keys that collided without a resolution policy.
    fn consolidate_arrays(&self, doc: &mut Document) -> BTreeSet<String> {
        let mut unresolved = BTreeSet::new();

        for child in &self.children {
            let Some(Value::Array(items)) = doc.get(&child.path) else {
                continue;
            };

            let mut items = items.clone();
            for key in &child.distinct {
                let outcome = consolidate(&items, key, &child.accumulators, &child.mergers);
                if let Some(key) = outcome.unresolved_key {
                    unresolved.insert(key);
                }
                items = outcome.items;
            }
            doc.set(child.path.clone(), Value::Array(items));
        }

        unresolved
    }

    /// Run the full validation pass for one write attempt.
    ///
    /// Store errors propagate untranslated. Detected conditions are
    /// aggregated: the independent category (per-field duplicates plus
    /// unresolved array keys) reports every flagged field at once; only
    /// when it is empty does a joint conflict report the full tuple.
    pub async fn validate(&self, doc: &mut Document, store: &dyn CountDocuments) -> Result<()> {
        let scope = self.scope_filter(doc);

        let mut flagged: BTreeMap<String, DuplicateKind> = BTreeMap::new();
        for key in self.consolidate_arrays(doc) {
            flagged.insert(key, DuplicateKind::UnresolvedArrayDuplicate);
        }

        let candidates = self.unique_candidates(doc);
        let joint_filter = self.joint_filter(doc);

        // Both categories probe concurrently; neither is cancelled early
        // because the full flagged set must be reported.
        let (per_field, joint_hit) = future::join(
            probe::find_duplicate_fields(store, &self.collection, doc, &candidates, &scope),
            probe::probe(store, &self.collection, &joint_filter, &scope),
        )
        .await;

        for field in per_field? {
            flagged.insert(field, DuplicateKind::DuplicateField);
        }
        let joint_hit = joint_hit?;

        if !flagged.is_empty() {
            debug!(
                "dedupe rejected write to '{}': {} flagged field(s)",
                self.collection,
                flagged.len()
            );
            return Err(DuplicateError::new(flagged).into());
        }

        if joint_hit {
            let members = self.directives.get(Directive::DedupeWith);
            debug!(
                "dedupe rejected write to '{}': joint tuple conflict",
                self.collection
            );
            return Err(DuplicateError::uniform(
                members.iter().cloned(),
                DuplicateKind::DuplicateJointFields,
            )
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl SaveHook for DedupeGuard {
    fn name(&self) -> &str {
        "dedupe"
    }

    async fn run(&self, doc: &mut Document, store: &dyn CountDocuments) -> Result<()> {
        self.validate(doc, store).await
    }
}
