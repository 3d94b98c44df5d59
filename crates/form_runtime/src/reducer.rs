//! Pure state transitions for [`FormState`].

use serde_json::{Map, Value};

use crate::model::FormState;
use crate::validation::FieldErrors;

/// Every state mutation a form controller can perform.
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    /// Replace one value and mark the field dirty.
    SetValue {
        /// Field key.
        field: String,
        /// New value.
        value: Value,
    },
    /// Merge several values.
    SetValues {
        /// Values merged over the current ones.
        values: Map<String, Value>,
    },
    /// Set or clear one field error.
    SetError {
        /// Field key.
        field: String,
        /// Message, or `None` to clear.
        error: Option<String>,
    },
    /// Replace the whole error map.
    SetErrors {
        /// New error map.
        errors: FieldErrors,
    },
    /// Mark one field touched.
    SetTouched {
        /// Field key.
        field: String,
    },
    /// Mark several fields touched.
    SetTouchedFields {
        /// Field keys.
        fields: Vec<String>,
    },
    /// Toggle the submitting flag.
    SetSubmitting {
        /// New flag value.
        is_submitting: bool,
    },
    /// Toggle the validating flag.
    SetValidating {
        /// New flag value.
        is_validating: bool,
    },
    /// Jump to a step. Bounds are checked by the controller.
    SetStep {
        /// Target step.
        step: u32,
    },
    /// Advance one step. Bounds are checked by the controller.
    NextStep,
    /// Go back one step, never below 1.
    PrevStep,
    /// Count a submit attempt.
    IncrementSubmitCount,
    /// Restore a pristine state.
    Reset {
        /// Values the fresh state starts with.
        values: Map<String, Value>,
    },
}

impl FormAction {
    /// Stable action name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetValue { .. } => "set_value",
            Self::SetValues { .. } => "set_values",
            Self::SetError { .. } => "set_error",
            Self::SetErrors { .. } => "set_errors",
            Self::SetTouched { .. } => "set_touched",
            Self::SetTouchedFields { .. } => "set_touched_fields",
            Self::SetSubmitting { .. } => "set_submitting",
            Self::SetValidating { .. } => "set_validating",
            Self::SetStep { .. } => "set_step",
            Self::NextStep => "next_step",
            Self::PrevStep => "prev_step",
            Self::IncrementSubmitCount => "increment_submit_count",
            Self::Reset { .. } => "reset",
        }
    }
}

/// Applies `action` to `state`.
///
/// `validation_version` only ever grows, including across [`FormAction::Reset`], so observers
/// can compare versions without tracking resets.
pub fn reduce_form(state: &mut FormState, action: FormAction) {
    match action {
        FormAction::SetValue { field, value } => {
            state.values.insert(field.clone(), value);
            state.dirty.insert(field);
            state.is_dirty = true;
        }
        FormAction::SetValues { values } => {
            state.values.extend(values);
            state.is_dirty = true;
        }
        FormAction::SetError { field, error } => {
            match error {
                Some(message) => {
                    state.errors.insert(field, message);
                }
                None => {
                    state.errors.remove(&field);
                }
            }
            errors_changed(state);
        }
        FormAction::SetErrors { errors } => {
            state.errors = errors;
            errors_changed(state);
        }
        FormAction::SetTouched { field } => {
            state.touched.insert(field);
            state.validation_version += 1;
        }
        FormAction::SetTouchedFields { fields } => {
            state.touched.extend(fields);
            state.validation_version += 1;
        }
        FormAction::SetSubmitting { is_submitting } => state.is_submitting = is_submitting,
        FormAction::SetValidating { is_validating } => state.is_validating = is_validating,
        FormAction::SetStep { step } => state.current_step = step,
        FormAction::NextStep => state.current_step += 1,
        FormAction::PrevStep => state.current_step = state.current_step.saturating_sub(1).max(1),
        FormAction::IncrementSubmitCount => state.submit_count += 1,
        FormAction::Reset { values } => {
            let version = state.validation_version + 1;
            *state = FormState::new(values);
            state.validation_version = version;
        }
    }
}

fn errors_changed(state: &mut FormState) {
    state.is_valid = state.errors.is_empty();
    state.validation_version += 1;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn reduce_all(state: &mut FormState, actions: impl IntoIterator<Item = FormAction>) {
        for action in actions {
            reduce_form(state, action);
        }
    }

    #[test]
    fn set_value_marks_field_and_form_dirty() {
        let mut state = FormState::default();
        reduce_form(
            &mut state,
            FormAction::SetValue {
                field: "name".into(),
                value: json!("Ada"),
            },
        );
        assert_eq!(state.value("name"), Some(&json!("Ada")));
        assert!(state.is_field_dirty("name"));
        assert!(state.is_dirty);
        assert_eq!(state.validation_version, 0);
    }

    #[test]
    fn error_mutations_track_validity_and_version() {
        let mut state = FormState::default();
        reduce_form(
            &mut state,
            FormAction::SetError {
                field: "name".into(),
                error: Some("Required".into()),
            },
        );
        assert!(!state.is_valid);
        assert_eq!(state.validation_version, 1);

        reduce_form(
            &mut state,
            FormAction::SetError {
                field: "name".into(),
                error: None,
            },
        );
        assert!(state.is_valid);
        assert!(state.errors.is_empty());
        assert_eq!(state.validation_version, 2);

        reduce_all(
            &mut state,
            [
                FormAction::SetTouched {
                    field: "name".into(),
                },
                FormAction::SetTouchedFields {
                    fields: vec!["a".into(), "b".into()],
                },
                FormAction::SetErrors {
                    errors: FieldErrors::new(),
                },
            ],
        );
        assert_eq!(state.validation_version, 5);
        assert_eq!(state.touched.len(), 3);
    }

    #[test]
    fn step_navigation_clamps_only_backwards() {
        let mut state = FormState::default();
        reduce_form(&mut state, FormAction::PrevStep);
        assert_eq!(state.current_step, 1);

        reduce_all(&mut state, [FormAction::NextStep, FormAction::NextStep]);
        assert_eq!(state.current_step, 3);

        reduce_all(
            &mut state,
            [FormAction::SetStep { step: 2 }, FormAction::PrevStep],
        );
        assert_eq!(state.current_step, 1);
    }

    #[test]
    fn flags_do_not_touch_other_fields() {
        let mut state = FormState::default();
        let before = state.clone();
        reduce_all(
            &mut state,
            [
                FormAction::SetSubmitting {
                    is_submitting: true,
                },
                FormAction::SetValidating {
                    is_validating: true,
                },
            ],
        );
        assert_eq!(
            state,
            FormState {
                is_submitting: true,
                is_validating: true,
                ..before
            }
        );
    }

    #[test]
    fn reset_restores_pristine_state_and_keeps_version_growing() {
        let mut state = FormState::default();
        reduce_all(
            &mut state,
            [
                FormAction::SetValue {
                    field: "name".into(),
                    value: json!("Ada"),
                },
                FormAction::SetError {
                    field: "name".into(),
                    error: Some("Taken".into()),
                },
                FormAction::IncrementSubmitCount,
                FormAction::NextStep,
            ],
        );
        let values = json!({ "name": "" }).as_object().cloned().expect("object");
        reduce_form(
            &mut state,
            FormAction::Reset {
                values: values.clone(),
            },
        );

        assert_eq!(
            state,
            FormState {
                validation_version: 2,
                ..FormState::new(values)
            }
        );
    }
}
