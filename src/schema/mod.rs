pub mod directives;
pub mod types;

pub use directives::{Directive, DirectiveTable, directive_fields};
pub use types::{FieldOptions, Schema};
