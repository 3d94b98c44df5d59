//! Schema-driven form runtime: field annotations, layout extraction, validation, and the form
//! controller state machine. Framework bindings build on the render contexts in [`render`].

pub mod annotations;
pub mod controller;
pub mod error;
pub mod layout;
pub mod model;
pub mod reducer;
pub mod render;
pub mod validation;

pub use annotations::{
    field_annotation, field_layout, field_ui, form_layout, ColumnSpan, FieldAnnotation,
    FieldLayoutAnnotation, FieldOption, FieldOptionGroup, FieldUiAnnotation, FieldUiKey,
    FieldLayoutKey, FormLayoutConfig, FormLayoutKey, InputType, LayoutGap, SchemaFormExt,
    SectionConfig, StepConfig,
};
pub use controller::{FormController, Unsubscribe};
pub use error::FormError;
pub use layout::{
    build_default_values, col_span_classes, extract_fields, extract_form, fields_for_section,
    fields_for_step, format_field_name, grid_classes, group_fields_by_section,
    group_fields_by_step, infer_input_type, required_fields, unwrap_type, visible_fields,
    ExtractedField, ExtractedForm, ExtractedSection, ExtractedStep,
};
pub use model::{FormConfig, FormState};
pub use reducer::{reduce_form, FormAction};
pub use render::{
    field_context, section_context, step_context, FieldRenderContext, SectionRenderContext,
    StepRenderContext,
};
pub use validation::{
    create_field_validator, extract_field_errors, first_error, has_errors, strip_empty_strings,
    validate, validate_async, validate_field, validate_fields, validate_sync, FieldErrors,
    FieldState, ValidationResult,
};
