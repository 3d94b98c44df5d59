//! Decodes candidate form values and flattens the issue tree into per-field messages.
//!
//! Validation failures are data: every entry point returns them as a [`FieldErrors`] map and
//! never as an error. The only `Err` here is [`FormError`], raised for schema mistakes.

use std::collections::BTreeMap;

use form_schema::{
    decode, format_issue, MessageAnnotation, ParseIssue, ParseOptions, PathSegment,
    RefinementKind, Schema, TransformationKind,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::FormError;

/// Dot-joined field path to message. Issues at the root are stored under `""`.
pub type FieldErrors = BTreeMap<String, String>;

const INVALID_VALUE: &str = "Invalid value";
const REQUIRED: &str = "This field is required";
const NOT_ALLOWED: &str = "This field is not allowed";

/// Outcome of validating a whole form.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Decoded output.
    Valid(Value),
    /// Per-field messages, never empty.
    Invalid(FieldErrors),
}

impl ValidationResult {
    /// Returns whether decoding succeeded.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Decoded output, when valid.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Valid(data) => Some(data),
            Self::Invalid(_) => None,
        }
    }

    /// Field messages, when invalid.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    /// Converts into a plain `Result`.
    pub fn into_result(self) -> Result<Value, FieldErrors> {
        match self {
            Self::Valid(data) => Ok(data),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

/// Drops blank and whitespace-only string members from objects, at every depth.
///
/// A blank text input then decodes as a missing key instead of failing a length or pattern
/// check on the empty string. Array items are never dropped.
pub fn strip_empty_strings(value: &Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .filter(|(_, value)| !is_blank(value))
                .map(|(key, value)| (key.clone(), strip_empty_strings(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_empty_strings).collect()),
        other => other.clone(),
    }
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|text| text.trim().is_empty())
}

/// Flattens an issue tree into one message per field path.
///
/// When several issues land on the same path, the last one visited wins.
pub fn extract_field_errors(issue: &ParseIssue) -> FieldErrors {
    let mut errors = FieldErrors::new();
    collect_issue(issue, "", &mut errors);
    errors
}

fn collect_issue(issue: &ParseIssue, path: &str, errors: &mut FieldErrors) {
    match issue {
        ParseIssue::Type { message, .. } => record(errors, path, message.as_deref(), INVALID_VALUE),
        ParseIssue::Missing { message, .. } => record(errors, path, message.as_deref(), REQUIRED),
        ParseIssue::Forbidden { message, .. } => {
            record(errors, path, message.as_deref(), NOT_ALLOWED)
        }
        ParseIssue::Pointer {
            path: segment,
            issue,
            ..
        } => collect_issue(issue, &join_path(path, segment), errors),
        ParseIssue::Composite { issues, .. } => {
            for issue in issues {
                collect_issue(issue, path, errors);
            }
        }
        ParseIssue::Refinement {
            ast,
            kind,
            issue: inner,
            ..
        } => match (ast.annotation::<MessageAnnotation>(), kind) {
            (Some(annotation), _) => {
                errors.insert(path.to_string(), annotation.render(issue));
            }
            (None, RefinementKind::Predicate) => {
                errors.insert(path.to_string(), format_issue(issue));
            }
            (None, RefinementKind::From) => collect_issue(inner, path, errors),
        },
        ParseIssue::Transformation {
            kind, issue: inner, ..
        } => match kind {
            TransformationKind::Transformation => {
                errors.insert(path.to_string(), format_issue(issue));
            }
            TransformationKind::Encoded | TransformationKind::Type => {
                collect_issue(inner, path, errors)
            }
        },
    }
}

fn record(errors: &mut FieldErrors, path: &str, message: Option<&str>, fallback: &str) {
    errors.insert(path.to_string(), message.unwrap_or(fallback).to_string());
}

fn join_path(prefix: &str, segment: &PathSegment) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Validates a whole form, reporting every failing field.
pub fn validate_sync(schema: &Schema, values: &Value) -> ValidationResult {
    match decode(schema, &strip_empty_strings(values), ParseOptions::all_errors()) {
        Ok(data) => ValidationResult::Valid(data),
        Err(issue) => ValidationResult::Invalid(extract_field_errors(&issue)),
    }
}

/// [`validate_sync`] as a `Result`.
///
/// # Errors
///
/// Returns the per-field messages when any field fails.
pub fn validate(schema: &Schema, values: &Value) -> Result<Value, FieldErrors> {
    validate_sync(schema, values).into_result()
}

/// Async entry point for validation that may later include remote checks.
///
/// Currently resolves to the synchronous result without suspending.
pub async fn validate_async(schema: &Schema, values: &Value) -> ValidationResult {
    validate_sync(schema, values)
}

/// Validates one value, stopping at the first issue.
///
/// Blank strings are not stripped here: a field schema sees exactly what the input holds.
pub fn validate_field(schema: &Schema, value: &Value) -> Option<String> {
    let issue = decode(schema, value, ParseOptions::first_error()).err()?;
    Some(
        extract_field_errors(&issue)
            .into_values()
            .next()
            .unwrap_or_else(|| INVALID_VALUE.to_string()),
    )
}

/// Builds a validator for the property `field_name` of a struct schema.
///
/// # Errors
///
/// Returns [`FormError::NotAStruct`] or [`FormError::FieldNotFound`] for schema mistakes.
pub fn create_field_validator(
    schema: &Schema,
    field_name: &str,
) -> Result<impl Fn(&Value) -> Option<String>, FormError> {
    let properties = schema.properties().ok_or(FormError::NotAStruct)?;
    let property = properties
        .iter()
        .find(|property| property.name == field_name)
        .ok_or_else(|| FormError::FieldNotFound(field_name.to_string()))?;
    let field_schema = property.schema.clone();
    Ok(move |value: &Value| validate_field(&field_schema, value))
}

/// Validates the given subset of fields independently.
///
/// Names that are not fields of the schema are skipped.
pub fn validate_fields(schema: &Schema, fields: &Map<String, Value>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (name, value) in fields {
        match create_field_validator(schema, name) {
            Ok(validator) => {
                if let Some(message) = validator(value) {
                    errors.insert(name.clone(), message);
                }
            }
            Err(error) => warn!(field = %name, %error, "skipping field validation"),
        }
    }
    errors
}

/// Returns whether any message is present.
pub fn has_errors(errors: &FieldErrors) -> bool {
    !errors.is_empty()
}

/// First message in path order.
pub fn first_error(errors: &FieldErrors) -> Option<&str> {
    errors.values().next().map(String::as_str)
}

/// Standalone state of one input, for callers managing fields without a controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldState {
    pub value: Value,
    pub error: Option<String>,
    pub touched: bool,
    pub dirty: bool,
    pub validating: bool,
}

impl FieldState {
    /// Pristine state holding `value`.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Replaces the value and marks the field dirty.
    pub fn with_value(self, value: Value) -> Self {
        Self {
            value,
            dirty: true,
            ..self
        }
    }

    /// Marks the field touched.
    pub fn touched(self) -> Self {
        Self {
            touched: true,
            ..self
        }
    }

    /// Replaces the error.
    pub fn with_error(self, error: Option<String>) -> Self {
        Self { error, ..self }
    }
}
