use crate::core::value::{identity_eq, numeric_add};
use log::warn;
use serde_json::Value;
use std::collections::BTreeSet;

/// Result of collapsing one array under one distinct key.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    /// Accepted entries, first-seen order of distinct key values preserved.
    pub items: Vec<Value>,
    /// The distinct key, when at least one collision had no resolution
    /// policy. The colliding entries are dropped regardless.
    pub unresolved_key: Option<String>,
}

/// Collapse array entries sharing a value at `key` into one entry.
///
/// Entries are visited in input order. An entry whose value at `key` matches
/// an already-accepted entry (identity-aware comparison) is folded into it:
/// each `accumulators` field is summed numerically, each `mergers` field is
/// overwritten by the incoming value, so later entries win. With neither
/// policy present the duplicate is dropped and the key reported as
/// unresolved.
///
/// Entries that are not objects, or that have no value at `key`, are
/// accepted verbatim and never participate in collapsing.
pub fn consolidate(
    items: &[Value],
    key: &str,
    accumulators: &BTreeSet<String>,
    mergers: &BTreeSet<String>,
) -> Consolidation {
    let mut accepted: Vec<Value> = Vec::with_capacity(items.len());
    let mut unresolved = false;

    for item in items {
        let key_value = match item.get(key) {
            Some(v) if !v.is_null() => v.clone(),
            _ => {
                accepted.push(item.clone());
                continue;
            }
        };

        let position = accepted
            .iter()
            .position(|entry| matches!(entry.get(key), Some(v) if identity_eq(v, &key_value)));

        let Some(position) = position else {
            accepted.push(item.clone());
            continue;
        };

        if accumulators.is_empty() && mergers.is_empty() {
            unresolved = true;
            continue;
        }

        let entry = &mut accepted[position];
        for path in accumulators {
            let incoming = item.get(path);
            let current = entry.get(path);
            match (current, incoming) {
                (Some(a), Some(b)) => match numeric_add(a, b) {
                    Some(sum) => {
                        entry[path.as_str()] = sum;
                    }
                    None => {
                        warn!("accumulate skipped non-numeric field '{path}'");
                    }
                },
                _ => warn!("accumulate skipped missing field '{path}'"),
            }
        }

        for path in mergers {
            if let Some(incoming) = item.get(path) {
                entry[path.as_str()] = incoming.clone();
            }
        }
    }

    Consolidation {
        items: accepted,
        unresolved_key: unresolved.then(|| key.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_accumulates_and_merges_colliding_entries() {
        let items = vec![
            json!({ "product": "Grill", "quantity": 3, "other": "STOVE" }),
            json!({ "product": "Grill", "quantity": 1, "other": "BBQ" }),
        ];

        let outcome = consolidate(&items, "product", &set(&["quantity"]), &set(&["other"]));

        assert!(outcome.unresolved_key.is_none());
        assert_eq!(
            outcome.items,
            vec![json!({ "product": "Grill", "quantity": 4, "other": "BBQ" })]
        );
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let items = vec![
            json!({ "product": "Grill", "quantity": 1 }),
            json!({ "product": "Stove", "quantity": 2 }),
            json!({ "product": "Grill", "quantity": 5 }),
        ];

        let outcome = consolidate(&items, "product", &set(&["quantity"]), &BTreeSet::new());

        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.items[0]["product"], json!("Grill"));
        assert_eq!(outcome.items[0]["quantity"], json!(6));
        assert_eq!(outcome.items[1]["product"], json!("Stove"));
    }

    #[test]
    fn test_collision_without_policy_drops_and_reports() {
        let items = vec![
            json!({ "product": "Grill" }),
            json!({ "product": "Grill" }),
            json!({ "product": "Stove" }),
        ];

        let outcome = consolidate(&items, "product", &BTreeSet::new(), &BTreeSet::new());

        assert_eq!(outcome.unresolved_key.as_deref(), Some("product"));
        assert_eq!(outcome.items.len(), 2);
    }

    #[test]
    fn test_entries_without_key_pass_through() {
        let items = vec![
            json!({ "quantity": 1 }),
            json!({ "quantity": 2 }),
            json!({ "product": null, "quantity": 3 }),
        ];

        let outcome = consolidate(&items, "product", &set(&["quantity"]), &BTreeSet::new());

        assert!(outcome.unresolved_key.is_none());
        assert_eq!(outcome.items.len(), 3);
    }

    #[test]
    fn test_identity_handles_collapse_by_id() {
        let items = vec![
            json!({ "product": { "_id": "p1", "label": "Grill" }, "quantity": 2 }),
            json!({ "product": { "_id": "p1", "label": "Grill (dup)" }, "quantity": 3 }),
        ];

        let outcome = consolidate(&items, "product", &set(&["quantity"]), &BTreeSet::new());

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0]["quantity"], json!(5));
    }

    #[test]
    fn test_non_numeric_accumulate_leaves_value() {
        let items = vec![
            json!({ "product": "Grill", "quantity": "three" }),
            json!({ "product": "Grill", "quantity": 1 }),
        ];

        let outcome = consolidate(&items, "product", &set(&["quantity"]), &BTreeSet::new());

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0]["quantity"], json!("three"));
    }

    #[test]
    fn test_merge_alone_wins_last() {
        let items = vec![
            json!({ "product": "Grill", "note": "first" }),
            json!({ "product": "Grill", "note": "last" }),
        ];

        let outcome = consolidate(&items, "product", &BTreeSet::new(), &set(&["note"]));

        assert!(outcome.unresolved_key.is_none());
        assert_eq!(outcome.items, vec![json!({ "product": "Grill", "note": "last" })]);
    }
}
