pub mod model;

pub use model::{HookPipeline, Model};
