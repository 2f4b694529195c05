use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a backing document store.
///
/// The validation engine never translates these; they propagate to the
/// caller as-is and abort the current write attempt.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: Uuid },

    #[error("Backend error: {0}")]
    Backend(String),
}
