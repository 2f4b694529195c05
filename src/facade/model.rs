use crate::core::{Document, Result};
use crate::engine::{DedupeGuard, DedupeOptions};
use crate::interface::{CountDocuments, DocumentStore, SaveHook};
use crate::schema::Schema;
use crate::storage::ID_FIELD;
use serde_json::Value;
use uuid::Uuid;

/// Ordered registry of pre-commit hooks.
///
/// Hooks run sequentially in registration order; the first failure vetoes
/// the write and later hooks do not run.
#[derive(Default)]
pub struct HookPipeline {
    hooks: Vec<Box<dyn SaveHook>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Box<dyn SaveHook>) {
        self.hooks.push(hook);
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub async fn run_all(&self, doc: &mut Document, store: &dyn CountDocuments) -> Result<()> {
        for hook in &self.hooks {
            hook.run(doc, store).await?;
        }
        Ok(())
    }
}

/// High-level handle binding a schema, its hooks, and a backing store.
///
/// This is the recommended way to use dupguard in applications: declare a
/// schema, attach the dedupe gate, then create and save documents through
/// the model.
///
/// # Examples
///
/// ```
/// use dupguard::{FieldOptions, MemoryStore, Model, Schema};
/// use serde_json::json;
///
/// # fn main() {
/// # tokio_test::block_on(async {
/// let schema = Schema::new("users")
///     .field("email", FieldOptions::new().dedupe());
///
/// let model = Model::new(schema, MemoryStore::new()).dedupe();
///
/// model.create(json!({ "email": "a@b.com" })).await.unwrap();
/// assert!(model.create(json!({ "email": "A@B.com" })).await.is_err());
/// # });
/// # }
/// ```
pub struct Model<S> {
    schema: Schema,
    pipeline: HookPipeline,
    store: S,
}

impl<S: DocumentStore> Model<S> {
    pub fn new(schema: Schema, store: S) -> Self {
        Self {
            schema,
            pipeline: HookPipeline::new(),
            store,
        }
    }

    /// Register an arbitrary pre-commit hook.
    pub fn hook(mut self, hook: Box<dyn SaveHook>) -> Self {
        self.pipeline.register(hook);
        self
    }

    /// Attach the dedupe gate with default options.
    pub fn dedupe(self) -> Self {
        let guard = DedupeGuard::new(&self.schema);
        self.hook(Box::new(guard))
    }

    /// Attach the dedupe gate with explicit options.
    pub fn dedupe_with(self, options: DedupeOptions) -> Self {
        let guard = DedupeGuard::with_options(&self.schema, options);
        self.hook(Box::new(guard))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build a new document and persist it through the hook pipeline.
    pub async fn create(&self, body: Value) -> Result<Document> {
        let mut doc = Document::new(body)?;
        self.save(&mut doc).await?;
        Ok(doc)
    }

    /// Run every hook, then insert or replace depending on whether the
    /// document already has a persisted identity.
    pub async fn save(&self, doc: &mut Document) -> Result<()> {
        self.pipeline.run_all(doc, &self.store).await?;

        let collection = self.schema.collection();
        match doc.id() {
            None => {
                let id = self.store.insert(collection, doc.body().clone()).await?;
                doc.mark_persisted(id);
            }
            Some(id) => {
                self.store.replace(collection, id, doc.body().clone()).await?;
                doc.mark_persisted(id);
            }
        }
        Ok(())
    }

    /// Rehydrate a persisted document by identity.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        let body = self.store.fetch(self.schema.collection(), id).await?;
        match body {
            Some(mut body) => {
                body.remove(ID_FIELD);
                Ok(Some(Document::persisted(id, Value::Object(body))?))
            }
            None => Ok(None),
        }
    }
}
