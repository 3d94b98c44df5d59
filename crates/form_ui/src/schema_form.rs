//! Components rendering an extracted form from the ambient [`FormContext`](crate::FormContext).

use std::rc::Rc;

use form_runtime::{
    field_context, section_context, step_context, ExtractedField, ExtractedSection, ExtractedStep,
    FieldRenderContext, InputType,
};
use futures::future::LocalBoxFuture;
use leptos::ev::{FocusEvent, MouseEvent, SubmitEvent};
use leptos::*;
use serde_json::{Number, Value};

use crate::context::use_form;
use crate::primitives::{
    bool_token, merge_layout_class, ActionButton, ActionVariant, CheckControl, FieldShell,
    FormGrid, InputControl, RadioGroupControl, SectionShell, SelectControl, StepNav, StepNavItem,
    StepStatus, TextAreaControl,
};

/// Async handler receiving validated form data.
///
/// An `Err` aborts the submission and is logged; the form keeps its values.
pub type SubmitHandler = Rc<dyn Fn(Value) -> LocalBoxFuture<'static, Result<(), String>>>;

pub(crate) fn html_input_type(input_type: InputType) -> &'static str {
    match input_type {
        InputType::Email => "email",
        InputType::Password => "password",
        InputType::Tel => "tel",
        InputType::Url => "url",
        InputType::Number => "number",
        InputType::Date => "date",
        InputType::Datetime => "datetime-local",
        InputType::File => "file",
        InputType::Hidden => "hidden",
        InputType::Checkbox | InputType::Switch => "checkbox",
        InputType::Radio => "radio",
        InputType::Text
        | InputType::Textarea
        | InputType::Select
        | InputType::Combobox => "text",
    }
}

/// Maps raw number-input text to a form value. Blank input stays an empty string so that
/// submission strips it; unparsable text is kept verbatim for the schema to reject.
///
/// Integers stay integers so the text written back into the input matches what was typed.
pub(crate) fn number_input_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    trimmed
        .parse::<Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) fn field_dom_id(name: &str) -> String {
    format!("form-field-{}", name.replace('.', "-"))
}

fn event_callback(
    on_change: &Rc<dyn Fn(Value)>,
    to_value: fn(&str) -> Value,
) -> Callback<web_sys::Event> {
    let on_change = Rc::clone(on_change);
    Callback::new(move |ev: web_sys::Event| on_change(to_value(&event_target_value(&ev))))
}

fn text_value(raw: &str) -> Value {
    Value::String(raw.to_string())
}

#[component]
/// Renders the whole form: step navigation, the active step or every section, and actions.
///
/// Must be placed inside a [`FormProvider`](crate::FormProvider).
pub fn SchemaForm(
    #[prop(optional)] layout_class: Option<&'static str>,
    /// Called with validated data on submit.
    #[prop(optional)]
    on_submit: Option<SubmitHandler>,
    /// Receives `true` when data passed validation and the handler succeeded.
    #[prop(optional)]
    on_submitted: Option<Callback<bool>>,
    #[prop(default = "Submit".to_string(), into)] submit_label: String,
    #[prop(default = "Back".to_string(), into)] previous_label: String,
    #[prop(default = "Next".to_string(), into)] next_label: String,
) -> impl IntoView {
    let form = use_form();
    let extracted = form.controller().form().clone();
    let is_multi_step = extracted.is_multi_step;
    let max_step = extracted.max_step();
    let current = create_memo(move |_| form.current_step());
    let is_submitting = Signal::derive(move || form.state.with(|state| state.is_submitting));
    let on_last_step = move || !is_multi_step || current.get() >= max_step;

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let controller = form.controller();
        if is_multi_step && current.get_untracked() < max_step {
            controller.next_step();
            return;
        }
        let handler = on_submit.clone();
        spawn_local(async move {
            let outcome = controller
                .submit(move |data| async move {
                    match handler {
                        Some(handler) => handler(data).await,
                        None => Ok(()),
                    }
                })
                .await;
            match outcome {
                Ok(submitted) => {
                    if let Some(on_submitted) = on_submitted {
                        on_submitted.call(submitted);
                    }
                }
                Err(err) => logging::warn!("form submission failed: {err}"),
            }
        });
    };

    let body = if is_multi_step {
        let items = extracted
            .steps
            .iter()
            .map(|step| StepNavItem {
                step: step.step,
                title: step.title.clone(),
                description: step.description.clone(),
            })
            .collect::<Vec<_>>();
        let steps = extracted.steps.clone();
        view! {
            <StepNav
                items=items
                current=current
                aria_label="Form progress"
                on_select=Callback::new(move |step: u32| form.controller().go_to_step(step))
            />
            {move || {
                let active = current.get();
                steps
                    .iter()
                    .find(|step| step.step == active)
                    .cloned()
                    .map(|step| view! { <SchemaStep step=step /> })
            }}
        }
        .into_view()
    } else {
        extracted
            .sections
            .into_iter()
            .map(|section| view! { <SchemaSection section=section /> })
            .collect_view()
    };

    view! {
        <form
            class=merge_layout_class("ui-schema-form", layout_class)
            novalidate=true
            aria-busy=move || bool_token(is_submitting.get())
            data-ui-primitive="true"
            data-ui-kind="schema-form"
            data-ui-multi-step=bool_token(is_multi_step)
            on:submit=submit
        >
            {body}
            <div class="ui-form-actions" data-ui-slot="actions">
                {is_multi_step
                    .then(|| {
                        view! {
                            <ActionButton
                                ui_slot="previous"
                                variant=ActionVariant::Ghost
                                disabled=Signal::derive(move || current.get() <= 1)
                                on_click=Callback::new(move |_: MouseEvent| {
                                    form.controller().prev_step()
                                })
                            >
                                {previous_label}
                            </ActionButton>
                        }
                    })}
                {move || {
                    let label = next_label.clone();
                    (!on_last_step())
                        .then(|| {
                            view! {
                                <ActionButton
                                    ui_slot="next"
                                    variant=ActionVariant::Primary
                                    on_click=Callback::new(move |_: MouseEvent| {
                                        form.controller().next_step();
                                    })
                                >
                                    {label}
                                </ActionButton>
                            }
                        })
                }}
                {move || {
                    let label = submit_label.clone();
                    on_last_step()
                        .then(|| {
                            view! {
                                <ActionButton
                                    ui_slot="submit"
                                    button_type="submit"
                                    variant=ActionVariant::Primary
                                    busy=is_submitting
                                >
                                    {label}
                                </ActionButton>
                            }
                        })
                }}
            </div>
        </form>
    }
}

#[component]
/// One wizard step with its sections.
pub fn SchemaStep(step: ExtractedStep) -> impl IntoView {
    let form = use_form();
    let context = step_context(&form.controller(), &step);
    let step_number = step.step;
    let status = move || StepStatus::of(step_number, form.current_step());

    view! {
        <section
            class="ui-form-step"
            aria-current=move || (status() == StepStatus::Active).then_some("step")
            data-ui-primitive="true"
            data-ui-kind="form-step"
            data-ui-step=step_number
            data-ui-state=move || status().token()
            data-ui-icon=context.step.icon.clone()
        >
            <header data-ui-slot="header">
                <h2 data-ui-slot="title">{context.step.title.clone()}</h2>
                {context
                    .step
                    .description
                    .clone()
                    .map(|description| view! { <p data-ui-slot="description">{description}</p> })}
            </header>
            {context
                .sections
                .into_iter()
                .map(|section| view! { <SchemaSection section=section.section /> })
                .collect_view()}
        </section>
    }
}

#[component]
/// One section laid out on the form grid.
pub fn SchemaSection(section: ExtractedSection) -> impl IntoView {
    let form = use_form();
    let controller = form.controller();
    let context = section_context(&controller, &section);
    let columns = controller.form().layout.columns;

    view! {
        <SectionShell
            section_id=section.id
            title=section.title
            description=section.description
            collapsible=section.collapsible
            default_collapsed=section.default_collapsed
        >
            <FormGrid layout_class=context.grid_class columns=columns ui_slot="fields">
                {context
                    .fields
                    .into_iter()
                    .map(|field| view! { <SchemaField field=field.field /> })
                    .collect_view()}
            </FormGrid>
        </SectionShell>
    }
}

#[component]
/// One field: picks a control for its input type and wires it to the controller.
pub fn SchemaField(field: ExtractedField) -> impl IntoView {
    let form = use_form();
    let handlers = field_context(&form.controller(), &field);
    let tracked_field = field.clone();
    let context = Signal::derive(move || {
        form.state.with(|_| ());
        field_context(&form.controller(), &tracked_field)
    });

    let value = Signal::derive(move || context.with(FieldRenderContext::value_text));
    let checked = Signal::derive(move || context.with(FieldRenderContext::is_checked));
    let error = Signal::derive(move || {
        context.with(|context| context.show_error.then(|| context.error.clone()).flatten())
    });
    let invalid = Signal::derive(move || error.with(Option::is_some));

    let on_blur = Rc::clone(&handlers.on_blur);
    let blur = Callback::new(move |_: FocusEvent| on_blur());

    if field.input_type == InputType::Hidden {
        return view! { <input type="hidden" name=field.name prop:value=move || value.get() /> }
            .into_view();
    }

    let id = field_dom_id(&field.name);
    let described_by = field
        .description
        .as_ref()
        .map(|_| format!("{id}-description"));
    let disabled = field.disabled;

    let control = match field.input_type {
        InputType::Textarea => view! {
            <TextAreaControl
                id=id.clone()
                name=field.name.clone()
                placeholder=field.placeholder.clone()
                described_by=described_by
                value=value
                disabled=disabled
                invalid=invalid
                readonly=field.readonly
                required=field.required
                on_input=event_callback(&handlers.on_change, text_value)
                on_blur=blur
            />
        }
        .into_view(),
        InputType::Select | InputType::Combobox => view! {
            <SelectControl
                id=id.clone()
                name=field.name.clone()
                options=field.options.clone().unwrap_or_default()
                option_groups=field.option_groups.clone().unwrap_or_default()
                placeholder=field.placeholder.clone()
                described_by=described_by
                value=value
                disabled=disabled
                invalid=invalid
                required=field.required
                on_change=event_callback(&handlers.on_change, text_value)
                on_blur=blur
            />
        }
        .into_view(),
        InputType::Radio => {
            let on_change = Rc::clone(&handlers.on_change);
            view! {
                <RadioGroupControl
                    name=field.name.clone()
                    options=field.options.clone().unwrap_or_default()
                    aria_label=field.label.clone()
                    value=value
                    disabled=disabled
                    invalid=invalid
                    on_change=Callback::new(move |picked: String| on_change(Value::String(picked)))
                    on_blur=blur
                />
            }
            .into_view()
        }
        InputType::Checkbox | InputType::Switch => {
            let on_change = Rc::clone(&handlers.on_change);
            view! {
                <CheckControl
                    id=id.clone()
                    name=field.name.clone()
                    switch=field.input_type == InputType::Switch
                    described_by=described_by
                    checked=checked
                    disabled=disabled
                    invalid=invalid
                    on_change=Callback::new(move |checked: bool| on_change(Value::Bool(checked)))
                    on_blur=blur
                />
            }
            .into_view()
        }
        input_type => {
            let to_value = if input_type == InputType::Number {
                number_input_value
            } else {
                text_value
            };
            view! {
                <InputControl
                    id=id.clone()
                    input_type=html_input_type(input_type)
                    name=field.name.clone()
                    placeholder=field.placeholder.clone()
                    autocomplete=field.autocomplete.clone()
                    described_by=described_by
                    value=value
                    disabled=disabled
                    invalid=invalid
                    readonly=field.readonly
                    required=field.required
                    on_input=event_callback(&handlers.on_change, to_value)
                    on_blur=blur
                />
            }
            .into_view()
        }
    };

    view! {
        <FieldShell
            control_id=id
            label=field.label.clone()
            description=field.description.clone()
            layout_class=handlers.col_span_class.clone()
            kind=field.input_type.token()
            required=field.required
            error=error
        >
            {control}
        </FieldShell>
    }
    .into_view()
}

#[cfg(test)]
mod tests {
    use form_runtime::{FormConfig, FormController};
    use form_schema::{PropertySignature, Schema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn input_types_map_to_html_types() {
        assert_eq!(html_input_type(InputType::Datetime), "datetime-local");
        assert_eq!(html_input_type(InputType::Combobox), "text");
        assert_eq!(html_input_type(InputType::Tel), "tel");
        assert_eq!(html_input_type(InputType::Switch), "checkbox");
    }

    #[test]
    fn number_input_keeps_blank_and_unparsable_text() {
        assert_eq!(number_input_value("  "), json!(""));
        assert_eq!(number_input_value("42"), json!(42));
        assert_eq!(number_input_value(" 1.5 "), json!(1.5));
        assert_eq!(number_input_value("12abc"), json!("12abc"));
    }

    #[test]
    fn typed_numbers_echo_back_as_typed() {
        let schema = Schema::object([PropertySignature::required("age", Schema::number())]);
        let controller =
            FormController::new(schema, FormConfig::default()).expect("struct schema");
        let field = controller.form().field("age").cloned().expect("age field");

        for typed in ["4", "42", "-7", "1.5"] {
            controller.set_value("age", number_input_value(typed));
            assert_eq!(field_context(&controller, &field).value_text(), typed);
        }
    }

    #[test]
    fn dom_ids_flatten_nested_names() {
        assert_eq!(field_dom_id("address.city"), "form-field-address-city");
    }
}
