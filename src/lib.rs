// ============================================================================
// DupGuard Library
// ============================================================================

pub mod core;
pub mod engine;
pub mod facade;
pub mod interface;
pub mod schema;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{Document, DuplicateError, DuplicateKind, GuardError, Result};
pub use engine::{DedupeGuard, DedupeOptions};
pub use facade::{HookPipeline, Model};
pub use interface::{CountDocuments, DocumentStore, SaveHook};
pub use schema::{Directive, DirectiveTable, FieldOptions, Schema, directive_fields};
pub use storage::{Condition, Filter, ID_FIELD, MemoryStore, StoreError, StoreResult};
