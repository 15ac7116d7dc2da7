pub mod binder;
pub mod file_field;

pub use binder::{bind, Binding, FieldValues, FALLBACK_KEY};
pub use file_field::{has_file_field, is_file_property, tool_has_file_field};
