use crate::core::{Document, Result};
use crate::storage::{Filter, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// The single store capability the validation engine depends on.
///
/// "Count documents matching a filter, scoped to a named collection." The
/// engine issues only these read operations; it never writes. Implement
/// this for a real database client to run validation against production
/// data, or use [`MemoryStore`](crate::storage::MemoryStore) for tests and
/// simple apps.
#[async_trait]
pub trait CountDocuments: Send + Sync {
    /// Number of documents in `collection` matching every condition of
    /// `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}

/// Full read/write surface required by the model facade.
///
/// Validation itself only needs [`CountDocuments`]; the extra operations
/// exist so [`Model`](crate::facade::Model) can drive the complete
/// save lifecycle.
#[async_trait]
pub trait DocumentStore: CountDocuments {
    /// Insert a new document body, returning its assigned identity.
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> StoreResult<Uuid>;

    /// Replace the body of an existing document.
    async fn replace(&self, collection: &str, id: Uuid, body: Map<String, Value>)
    -> StoreResult<()>;

    /// Fetch a document body by identity.
    async fn fetch(&self, collection: &str, id: Uuid) -> StoreResult<Option<Map<String, Value>>>;
}

/// A named lifecycle hook fired before a document is committed.
///
/// Hooks receive the in-progress document (and may rewrite it, as array
/// consolidation does) plus the store's count capability. Returning an
/// error vetoes the write. [`DedupeGuard`](crate::engine::DedupeGuard) is
/// the hook this crate ships; applications may register their own.
#[async_trait]
pub trait SaveHook: Send + Sync {
    /// Stable hook name, used in diagnostics.
    fn name(&self) -> &str;

    /// Run the hook against one in-progress document.
    async fn run(&self, doc: &mut Document, store: &dyn CountDocuments) -> Result<()>;
}
