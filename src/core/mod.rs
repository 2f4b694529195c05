pub mod document;
pub mod error;
pub mod value;

pub use document::Document;
pub use error::{DuplicateError, DuplicateKind, GuardError, Result};
pub use value::{identity_eq, numeric_add};
