//! Developer-facing errors raised while wiring a schema into a form.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Schema shape errors. These point at a programming mistake in the schema declaration and are
/// expected to surface at setup time, never per keystroke.
pub enum FormError {
    /// The schema root is not an object of declared properties.
    #[error("schema root is not a struct")]
    NotAStruct,
    /// The named field is not declared on the schema.
    #[error("field `{0}` not found in schema")]
    FieldNotFound(String),
}
