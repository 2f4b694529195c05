use crate::core::Document;
use crate::interface::CountDocuments;
use crate::storage::{Condition, Filter, StoreResult};
use futures::future;
use serde_json::Value;

/// Store condition for one probed value. Strings match case-insensitively
/// (anchored, full string); everything else by strict equality.
pub fn value_condition(value: &Value) -> Condition {
    match value {
        Value::String(s) => Condition::MatchesInsensitive(s.clone()),
        other => Condition::Equals(other.clone()),
    }
}

/// Build a probe filter from the document's current values for `fields`.
///
/// Fields that are absent or null on the document contribute nothing; a
/// value the document does not carry cannot collide.
pub fn field_conditions<'a, I>(doc: &Document, fields: I) -> Filter
where
    I: IntoIterator<Item = &'a String>,
{
    let mut filter = Filter::new();
    for field in fields {
        if let Some(value) = doc.value_of(field) {
            filter.insert(field.clone(), value_condition(value));
        }
    }
    filter
}

/// True iff at least one document in `collection` matches all of `fields`
/// combined with `scope`.
///
/// An empty field filter resolves false without issuing a query; probing
/// nothing must not degenerate into an unconditional count-all.
pub async fn probe(
    store: &dyn CountDocuments,
    collection: &str,
    fields: &Filter,
    scope: &Filter,
) -> StoreResult<bool> {
    if fields.is_empty() {
        return Ok(false);
    }

    let mut query = fields.clone();
    query.extend(scope);

    let count = store.count(collection, &query).await?;
    Ok(count > 0)
}

/// Probe each candidate field independently and return the ones that
/// individually conflict.
///
/// The per-field probes are independent, so they are issued as one batch of
/// concurrent tasks and joined before returning; every probe completes even
/// after a hit is found, since the caller reports the full conflicting set.
/// Result order is not significant.
pub async fn find_duplicate_fields<'a, I>(
    store: &dyn CountDocuments,
    collection: &str,
    doc: &Document,
    candidates: I,
    scope: &Filter,
) -> StoreResult<Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let probes = candidates.into_iter().map(|field| async move {
        let filter = field_conditions(doc, std::iter::once(field));
        probe(store, collection, &filter, scope)
            .await
            .map(|hit| hit.then(|| field.clone()))
    });

    let joined = future::join_all(probes).await;

    let mut conflicting = Vec::new();
    for outcome in joined {
        if let Some(field) = outcome? {
            conflicting.push(field);
        }
    }
    Ok(conflicting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::DocumentStore;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn names(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_fields_short_circuit() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store
                .insert("users", object(json!({ "email": "a@b.com" })))
                .await
                .unwrap();

            // Scope alone matches everything; the probe must still resolve
            // false because there is no field filter.
            let hit = probe(&store, "users", &Filter::new(), &Filter::new())
                .await
                .unwrap();
            assert!(!hit);
        });
    }

    #[test]
    fn test_probe_matches_strings_case_insensitively() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store
                .insert("users", object(json!({ "email": "a@b.com" })))
                .await
                .unwrap();

            let doc = Document::new(json!({ "email": "A@B.com" })).unwrap();
            let filter = field_conditions(&doc, &names(&["email"]));
            let hit = probe(&store, "users", &filter, &Filter::new()).await.unwrap();
            assert!(hit);
        });
    }

    #[test]
    fn test_find_duplicate_fields_reports_only_conflicts() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store
                .insert("users", object(json!({ "email": "a@b.com", "phone": "123" })))
                .await
                .unwrap();

            let doc =
                Document::new(json!({ "email": "a@b.com", "phone": "999", "name": "X" })).unwrap();
            let candidates = names(&["email", "phone", "name"]);

            let mut conflicting =
                find_duplicate_fields(&store, "users", &doc, &candidates, &Filter::new())
                    .await
                    .unwrap();
            conflicting.sort();
            assert_eq!(conflicting, vec!["email".to_string()]);
        });
    }

    #[test]
    fn test_unset_candidates_never_conflict() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store
                .insert("users", object(json!({ "email": "a@b.com" })))
                .await
                .unwrap();

            let doc = Document::new(json!({})).unwrap();
            let conflicting =
                find_duplicate_fields(&store, "users", &doc, &names(&["email"]), &Filter::new())
                    .await
                    .unwrap();
            assert!(conflicting.is_empty());
        });
    }

    #[test]
    fn test_scope_narrows_the_probe() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store
                .insert("users", object(json!({ "email": "a@b.com", "active": false })))
                .await
                .unwrap();

            let doc = Document::new(json!({ "email": "a@b.com" })).unwrap();
            let filter = field_conditions(&doc, &names(&["email"]));

            let mut scope = Filter::new();
            scope.insert("active", Condition::Equals(json!(true)));

            let hit = probe(&store, "users", &filter, &scope).await.unwrap();
            assert!(!hit);
        });
    }
}
