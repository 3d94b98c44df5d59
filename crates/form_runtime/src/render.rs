//! Read-only view models handed to presentation code.
//!
//! Contexts are snapshots of the controller state at build time. Their callbacks write back
//! through the controller, so a rendering layer rebuilds contexts after each notification.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::controller::FormController;
use crate::layout::{col_span_classes, grid_classes, ExtractedField, ExtractedSection, ExtractedStep};

/// Everything needed to render one field.
#[derive(Clone)]
pub struct FieldRenderContext {
    pub field: ExtractedField,
    pub value: Value,
    pub error: Option<String>,
    /// Error should be displayed (touched or submitted).
    pub show_error: bool,
    pub touched: bool,
    pub dirty: bool,
    pub col_span_class: String,
    /// Writes a new value through the controller.
    pub on_change: Rc<dyn Fn(Value)>,
    /// Reports a blur through the controller.
    pub on_blur: Rc<dyn Fn()>,
}

impl FieldRenderContext {
    /// Value as text for text-like controls; `null` renders empty.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Value as a checkbox state.
    pub fn is_checked(&self) -> bool {
        self.value.as_bool().unwrap_or(false)
    }
}

impl fmt::Debug for FieldRenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRenderContext")
            .field("field", &self.field.name)
            .field("value", &self.value)
            .field("error", &self.error)
            .field("show_error", &self.show_error)
            .field("touched", &self.touched)
            .field("dirty", &self.dirty)
            .field("col_span_class", &self.col_span_class)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct SectionRenderContext {
    pub section: ExtractedSection,
    pub fields: Vec<FieldRenderContext>,
    pub grid_class: String,
}

#[derive(Debug, Clone)]
pub struct StepRenderContext {
    pub step: ExtractedStep,
    pub sections: Vec<SectionRenderContext>,
    pub is_active: bool,
    /// Step lies before the current one.
    pub is_completed: bool,
    /// Step is the current one or lies before it.
    pub can_navigate_to: bool,
}

pub fn field_context(controller: &FormController, field: &ExtractedField) -> FieldRenderContext {
    let state = controller.field_state(&field.name);
    let change_target = controller.clone();
    let change_name = field.name.clone();
    let blur_target = controller.clone();
    let blur_name = field.name.clone();
    FieldRenderContext {
        field: field.clone(),
        value: state.value,
        error: state.error,
        show_error: controller.should_show_error(&field.name),
        touched: state.touched,
        dirty: state.dirty,
        col_span_class: col_span_classes(field),
        on_change: Rc::new(move |value| change_target.set_value(&change_name, value)),
        on_blur: Rc::new(move || blur_target.handle_blur(&blur_name)),
    }
}

pub fn section_context(
    controller: &FormController,
    section: &ExtractedSection,
) -> SectionRenderContext {
    SectionRenderContext {
        section: section.clone(),
        fields: section
            .fields
            .iter()
            .map(|field| field_context(controller, field))
            .collect(),
        grid_class: grid_classes(&controller.form().layout),
    }
}

pub fn step_context(controller: &FormController, step: &ExtractedStep) -> StepRenderContext {
    let current = controller.with_state(|state| state.current_step);
    StepRenderContext {
        step: step.clone(),
        sections: step
            .sections
            .iter()
            .map(|section| section_context(controller, section))
            .collect(),
        is_active: step.step == current,
        is_completed: step.step < current,
        can_navigate_to: step.step <= current,
    }
}

#[cfg(test)]
mod tests {
    use form_schema::{PropertySignature, Schema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::annotations::{ColumnSpan, FieldLayoutAnnotation, FormLayoutConfig, SchemaFormExt};
    use crate::model::FormConfig;

    fn controller() -> FormController {
        let schema = Schema::object([
            PropertySignature::required(
                "name",
                Schema::string()
                    .min_length(2)
                    .with_field_layout(FieldLayoutAnnotation::default().col_span(ColumnSpan::cols(6))),
            ),
            PropertySignature::required(
                "age",
                Schema::number().with_field_layout(FieldLayoutAnnotation::default().step(2)),
            ),
        ])
        .with_form_layout(FormLayoutConfig {
            columns: Some(2),
            ..FormLayoutConfig::default()
        });
        FormController::new(schema, FormConfig::default()).expect("struct schema")
    }

    #[test]
    fn field_callbacks_write_through_controller() {
        let controller = controller();
        let field = controller.form().field("name").cloned().expect("name field");
        let context = field_context(&controller, &field);
        assert_eq!(context.value_text(), "");
        assert_eq!(context.col_span_class, "col-span-6");

        (context.on_change)(json!("A"));
        (context.on_blur)();

        let refreshed = field_context(&controller, &field);
        assert_eq!(refreshed.value_text(), "A");
        assert!(refreshed.dirty);
        assert!(refreshed.touched);
        assert!(refreshed.show_error);
        assert!(refreshed.error.is_some());
        // Earlier snapshots are not updated.
        assert_eq!(context.value_text(), "");
    }

    #[test]
    fn section_context_uses_form_grid() {
        let controller = controller();
        let section = controller.form().sections[0].clone();
        let context = section_context(&controller, &section);
        assert_eq!(context.grid_class, "grid grid-cols-2 gap-4");
        assert_eq!(context.fields.len(), 2);
    }

    #[test]
    fn step_flags_follow_current_step() {
        let controller = controller();
        controller.set_value("name", json!("Ada"));
        assert!(controller.next_step());

        let flags: Vec<_> = controller
            .form()
            .steps
            .iter()
            .map(|step| {
                let context = step_context(&controller, step);
                (context.is_active, context.is_completed, context.can_navigate_to)
            })
            .collect();
        assert_eq!(flags, vec![(false, true, true), (true, false, true)]);
    }
}
