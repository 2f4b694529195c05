use crate::interface::{CountDocuments, DocumentStore};
use crate::storage::{Filter, ID_FIELD, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory document store keyed by collection name.
///
/// The default backing store for examples and tests. Collections are
/// created lazily on first insert; counting against an unknown collection
/// yields zero rather than an error, matching how a document store treats
/// empty collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Map<String, Value>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held by a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl CountDocuments for MemoryStore {
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|body| filter.matches(body)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut body: Map<String, Value>) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().push(body);
        Ok(id)
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        mut body: Map<String, Value>,
    ) -> StoreResult<()> {
        let id_value = Value::String(id.to_string());
        let mut collections = self.collections.write().await;

        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.get(ID_FIELD) == Some(&id_value)))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })?;

        body.insert(ID_FIELD.to_string(), id_value);
        *slot = body;
        Ok(())
    }

    async fn fetch(&self, collection: &str, id: Uuid) -> StoreResult<Option<Map<String, Value>>> {
        let id_value = Value::String(id.to_string());
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.get(ID_FIELD) == Some(&id_value)))
            .cloned())
    }
}
