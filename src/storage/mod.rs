pub mod error;
pub mod filter;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use filter::{Condition, Filter, ID_FIELD};
pub use memory::MemoryStore;
