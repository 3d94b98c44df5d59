//! Stateful form handle: owns [`FormState`], runs validation, and notifies subscribers.
//!
//! The controller is the only mutator of its state. Every change goes through
//! [`FormController::dispatch`], which runs [`reduce_form`] and then notifies subscribers
//! synchronously, in registration order, with a snapshot of the new state. Validation failures
//! never surface as errors here; they are written into the state's error map.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use form_schema::Schema;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FormError;
use crate::layout::{build_default_values, extract_form, ExtractedForm};
use crate::model::{FormConfig, FormState};
use crate::reducer::{reduce_form, FormAction};
use crate::validation::{validate_sync, FieldErrors, FieldState, ValidationResult};

type Listener = Rc<dyn Fn(&FormState)>;

struct ControllerInner {
    schema: Schema,
    form: ExtractedForm,
    config: FormConfig,
    state: RefCell<FormState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener_id: Cell<u64>,
}

/// Shared handle to one form's state machine.
///
/// Clones refer to the same form.
#[derive(Clone)]
pub struct FormController {
    inner: Rc<ControllerInner>,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("fields", &self.inner.form.fields.len())
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

/// Handle returned by [`FormController::subscribe`].
///
/// Dropping it keeps the subscription alive; call [`Unsubscribe::unsubscribe`] to stop
/// receiving notifications.
#[must_use = "the listener stays registered until `unsubscribe` is called"]
pub struct Unsubscribe {
    inner: Weak<ControllerInner>,
    id: u64,
}

impl Unsubscribe {
    /// Removes the listener. Does nothing if the controller is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

struct SubmittingGuard<'a> {
    controller: &'a FormController,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.controller.dispatch(FormAction::SetSubmitting {
            is_submitting: false,
        });
    }
}

impl FormController {
    /// Builds a controller for a struct schema.
    ///
    /// Initial values are the schema defaults merged with `config.initial_values`. With
    /// `validate_on_mount`, the initial values are validated before the controller is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotAStruct`] when the schema root is not an object.
    pub fn new(schema: Schema, config: FormConfig) -> Result<Self, FormError> {
        let form = extract_form(&schema)?;
        let values = merge_values(
            build_default_values(&form.fields),
            config.initial_values.clone(),
        );
        let mut state = FormState::new(values);
        if config.validate_on_mount {
            if let ValidationResult::Invalid(errors) = validate_sync(&schema, &state.values_json())
            {
                state.is_valid = errors.is_empty();
                state.errors = errors;
            }
        }

        Ok(Self {
            inner: Rc::new(ControllerInner {
                schema,
                form,
                config,
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            }),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Layout projection computed at construction.
    pub fn form(&self) -> &ExtractedForm {
        &self.inner.form
    }

    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FormState {
        self.inner.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn with_state<R>(&self, read: impl FnOnce(&FormState) -> R) -> R {
        read(&self.inner.state.borrow())
    }

    /// Highest declared step.
    pub fn max_step(&self) -> u32 {
        self.inner.form.max_step()
    }

    /// Registers `listener` for every state change.
    pub fn subscribe(&self, listener: impl Fn(&FormState) + 'static) -> Unsubscribe {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Unsubscribe {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Applies `action` and notifies subscribers when the state changed.
    ///
    /// Listeners may call back into the controller.
    pub fn dispatch(&self, action: FormAction) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            let previous = state.clone();
            debug!(action = action.name(), "form action");
            reduce_form(&mut state, action);
            if *state == previous {
                return;
            }
            state.clone()
        };

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Sets one value. Equal values are ignored without notifying anyone.
    pub fn set_value(&self, field: &str, value: Value) {
        let (unchanged, has_error) = self.with_state(|state| {
            (
                state.value(field) == Some(&value),
                state.errors.contains_key(field),
            )
        });
        if unchanged {
            return;
        }

        self.dispatch(FormAction::SetValue {
            field: field.to_string(),
            value,
        });

        let config = &self.inner.config;
        if config.validate_on_change || (config.revalidate_on_change && has_error) {
            self.validate_field(field);
        }
    }

    /// Merges several values without validating.
    pub fn set_values(&self, values: Map<String, Value>) {
        self.dispatch(FormAction::SetValues { values });
    }

    /// Marks a field touched and, when configured, validates it.
    pub fn handle_blur(&self, field: &str) {
        self.dispatch(FormAction::SetTouched {
            field: field.to_string(),
        });
        if self.inner.config.validate_on_blur {
            self.validate_field(field);
        }
    }

    /// Validates the whole form and records only `field`'s outcome.
    ///
    /// Returns `None` without touching state when `field` is not part of the form.
    pub fn validate_field(&self, field: &str) -> Option<String> {
        self.inner.form.field(field)?;
        let result = self.run_validation();
        let error = result
            .errors()
            .and_then(|errors| errors.get(field))
            .cloned();
        self.dispatch(FormAction::SetError {
            field: field.to_string(),
            error: error.clone(),
        });
        error
    }

    /// Validates the whole form and replaces the error map with the outcome.
    pub fn validate(&self) -> ValidationResult {
        self.dispatch(FormAction::SetValidating {
            is_validating: true,
        });
        let result = self.run_validation();
        self.dispatch(FormAction::SetErrors {
            errors: result.errors().cloned().unwrap_or_default(),
        });
        self.dispatch(FormAction::SetValidating {
            is_validating: false,
        });
        result
    }

    /// Validates the current step's fields.
    ///
    /// On failure, marks every step field touched and replaces the error map with the step's
    /// errors. A valid step leaves the state untouched.
    pub fn validate_step(&self) -> bool {
        let step_fields = self.current_step_fields();
        let step_errors: FieldErrors = match self.run_validation() {
            ValidationResult::Valid(_) => FieldErrors::new(),
            ValidationResult::Invalid(errors) => errors
                .into_iter()
                .filter(|(path, _)| step_fields.contains(path))
                .collect(),
        };
        if step_errors.is_empty() {
            return true;
        }

        self.dispatch(FormAction::SetTouchedFields {
            fields: step_fields,
        });
        self.dispatch(FormAction::SetErrors {
            errors: step_errors,
        });
        false
    }

    /// Advances one step when the current step is valid and a further step exists.
    pub fn next_step(&self) -> bool {
        if !self.validate_step() {
            return false;
        }
        let current = self.with_state(|state| state.current_step);
        if current >= self.max_step() {
            return false;
        }
        debug!(from = current, to = current + 1, "form step advanced");
        self.dispatch(FormAction::NextStep);
        true
    }

    /// Goes back one step, stopping at 1.
    pub fn prev_step(&self) {
        self.dispatch(FormAction::PrevStep);
    }

    /// Jumps to `step`, clamped to the declared steps.
    pub fn go_to_step(&self, step: u32) {
        let step = step.clamp(1, self.max_step());
        debug!(step, "form step selected");
        self.dispatch(FormAction::SetStep { step });
    }

    /// Validates and, when valid, hands the decoded data to `handler`.
    ///
    /// Resolves to `Ok(false)` without calling `handler` when validation fails and to
    /// `Ok(true)` once `handler` succeeds. `is_submitting` is cleared on every exit path,
    /// including a panicking handler.
    ///
    /// # Errors
    ///
    /// Returns the handler's error.
    pub async fn submit<F, Fut, E>(&self, handler: F) -> Result<bool, E>
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        self.dispatch(FormAction::IncrementSubmitCount);
        self.dispatch(FormAction::SetSubmitting {
            is_submitting: true,
        });
        let _guard = SubmittingGuard { controller: self };

        let ValidationResult::Valid(data) = self.validate() else {
            return Ok(false);
        };
        handler(data).await?;
        Ok(true)
    }

    /// Restores a pristine state seeded with schema defaults merged with `values`, or with the
    /// configured initial values when `values` is `None`.
    pub fn reset(&self, values: Option<Map<String, Value>>) {
        let overrides = values.or_else(|| self.inner.config.initial_values.clone());
        let values = merge_values(build_default_values(&self.inner.form.fields), overrides);
        self.dispatch(FormAction::Reset { values });
    }

    /// Records an error from outside schema validation, such as a server response.
    pub fn set_field_error(&self, field: &str, error: impl Into<String>) {
        self.dispatch(FormAction::SetError {
            field: field.to_string(),
            error: Some(error.into()),
        });
    }

    /// Replaces the error map.
    pub fn set_errors(&self, errors: FieldErrors) {
        self.dispatch(FormAction::SetErrors { errors });
    }

    pub fn field_state(&self, field: &str) -> FieldState {
        self.with_state(|state| state.field_state(field))
    }

    /// Whether `field` has an error and was touched or the form was submitted.
    pub fn should_show_error(&self, field: &str) -> bool {
        self.with_state(|state| state.should_show_error(field))
    }

    fn run_validation(&self) -> ValidationResult {
        let values = self.with_state(FormState::values_json);
        validate_sync(&self.inner.schema, &values)
    }

    fn current_step_fields(&self) -> Vec<String> {
        let current = self.with_state(|state| state.current_step);
        self.inner
            .form
            .step(current)
            .map(|step| step.fields.iter().map(|field| field.name.clone()).collect())
            .unwrap_or_default()
    }
}

fn merge_values(
    mut base: Map<String, Value>,
    overrides: Option<Map<String, Value>>,
) -> Map<String, Value> {
    if let Some(overrides) = overrides {
        base.extend(overrides);
    }
    base
}
