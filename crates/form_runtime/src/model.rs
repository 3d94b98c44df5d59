//! Form state owned by the controller and the configuration it is built with.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::{FieldErrors, FieldState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub values: Map<String, Value>,
    pub errors: FieldErrors,
    pub touched: BTreeSet<String>,
    pub dirty: BTreeSet<String>,
    pub is_submitting: bool,
    pub is_validating: bool,
    pub is_valid: bool,
    pub is_dirty: bool,
    pub submit_count: u32,
    pub current_step: u32,
    /// Bumped on every change to `errors` or `touched`.
    pub validation_version: u64,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

impl FormState {
    /// Pristine state seeded with `values`, on step 1.
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            is_submitting: false,
            is_validating: false,
            is_valid: true,
            is_dirty: false,
            submit_count: 0,
            current_step: 1,
            validation_version: 0,
        }
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    /// Errors are shown once a field was blurred or the form was submitted.
    pub fn should_show_error(&self, field: &str) -> bool {
        self.errors.contains_key(field) && (self.is_touched(field) || self.submit_count > 0)
    }

    /// Snapshot of one field.
    pub fn field_state(&self, field: &str) -> FieldState {
        FieldState {
            value: self.value(field).cloned().unwrap_or(Value::Null),
            error: self.errors.get(field).cloned(),
            touched: self.is_touched(field),
            dirty: self.is_field_dirty(field),
            validating: self.is_validating,
        }
    }

    /// Values as a JSON object.
    pub fn values_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Controller behavior switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// Overrides merged over schema defaults.
    pub initial_values: Option<Map<String, Value>>,
    pub validate_on_change: bool,
    pub validate_on_blur: bool,
    pub validate_on_mount: bool,
    /// With `validate_on_change` off, re-validate fields that already show an error.
    pub revalidate_on_change: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            initial_values: None,
            validate_on_change: true,
            validate_on_blur: true,
            validate_on_mount: false,
            revalidate_on_change: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn config_loads_with_defaults() {
        let config: FormConfig = serde_json::from_value(json!({
            "validateOnChange": false,
            "initialValues": { "name": "Ada" }
        }))
        .expect("config");
        assert_eq!(
            config,
            FormConfig {
                initial_values: Some(
                    json!({ "name": "Ada" })
                        .as_object()
                        .cloned()
                        .expect("object")
                ),
                validate_on_change: false,
                ..FormConfig::default()
            }
        );
    }

    #[test]
    fn errors_hidden_until_touched_or_submitted() {
        let mut state = FormState::default();
        state.errors.insert("name".into(), "Required".into());
        assert!(!state.should_show_error("name"));

        state.touched.insert("name".into());
        assert!(state.should_show_error("name"));

        state.touched.clear();
        state.submit_count = 1;
        assert!(state.should_show_error("name"));
        assert!(!state.should_show_error("email"));
    }
}
