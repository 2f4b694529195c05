pub mod consolidate;
pub mod probe;
pub mod validator;

pub use consolidate::{Consolidation, consolidate};
pub use probe::{field_conditions, find_duplicate_fields, probe};
pub use validator::{DedupeGuard, DedupeOptions};
