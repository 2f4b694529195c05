use dupguard::{DuplicateKind, FieldOptions, GuardError, MemoryStore, Model, Schema};
use serde_json::json;

fn order_schema() -> Schema {
    Schema::new("orders")
        .child(
            "items",
            Schema::new("items")
                .field("product", FieldOptions::new().distinct())
                .field("quantity", FieldOptions::new().accumulate())
                .field("other", FieldOptions::new().merge()),
        )
        .child(
            "strict_items",
            Schema::new("strict_items").field("product", FieldOptions::new().distinct()),
        )
}

fn model() -> Model<MemoryStore> {
    Model::new(order_schema(), MemoryStore::new()).dedupe()
}

#[tokio::test]
async fn test_matched_sub_documents_merge_before_persisting() {
    let model = model();

    let doc = model
        .create(json!({
            "items": [
                { "product": "Grill", "quantity": 3, "other": "STOVE" },
                { "product": "Grill", "quantity": 1, "other": "BBQ" },
            ],
        }))
        .await
        .unwrap();

    assert_eq!(
        doc.get("items"),
        Some(&json!([
            { "product": "Grill", "quantity": 4, "other": "BBQ" },
        ]))
    );

    // The consolidated form is what reached the store.
    let stored = model.find_by_id(doc.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.get("items"), doc.get("items"));
}

#[tokio::test]
async fn test_distinct_products_stay_separate() {
    let model = model();

    let doc = model
        .create(json!({
            "items": [
                { "product": "Grill", "quantity": 3, "other": "A" },
                { "product": "Stove", "quantity": 1, "other": "B" },
            ],
        }))
        .await
        .unwrap();

    let items = doc.get("items").unwrap().as_array().unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_duplicate_without_policy_rejects_the_write() {
    let model = model();

    let err = model
        .create(json!({
            "strict_items": [
                { "product": "Grill" },
                { "product": "Grill" },
            ],
        }))
        .await
        .unwrap_err();

    match err {
        GuardError::Duplicate(dup) => {
            assert_eq!(
                dup.kind_of("product"),
                Some(DuplicateKind::UnresolvedArrayDuplicate)
            );
        }
        other => panic!("expected a duplicate failure, got {other}"),
    }
    assert!(model.store().is_empty("orders").await);
}

#[tokio::test]
async fn test_arrays_without_directives_pass_through() {
    let plain = Schema::new("orders").child("items", Schema::new("items"));
    let model = Model::new(plain, MemoryStore::new()).dedupe();

    let doc = model
        .create(json!({
            "items": [
                { "product": "Grill" },
                { "product": "Grill" },
            ],
        }))
        .await
        .unwrap();

    let items = doc.get("items").unwrap().as_array().unwrap();
    assert_eq!(items.len(), 2);
}
