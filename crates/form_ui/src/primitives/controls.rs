use form_runtime::{FieldOption, FieldOptionGroup};

use super::*;

#[component]
/// Single-line input for text-like, numeric, and date values.
pub fn InputControl(
    #[prop(into)] id: String,
    #[prop(optional)] input_type: Option<&'static str>,
    #[prop(optional, into)] name: Option<String>,
    #[prop(default = None, into)] placeholder: Option<String>,
    #[prop(default = None, into)] autocomplete: Option<String>,
    #[prop(default = None, into)] described_by: Option<String>,
    #[prop(optional, into)] value: MaybeSignal<String>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] invalid: MaybeSignal<bool>,
    #[prop(optional)] readonly: bool,
    #[prop(optional)] required: bool,
    #[prop(optional)] on_input: Option<Callback<web_sys::Event>>,
    #[prop(optional)] on_blur: Option<Callback<FocusEvent>>,
) -> impl IntoView {
    view! {
        <input
            class="ui-form-input"
            id=id
            name=name
            type=input_type.unwrap_or("text")
            placeholder=placeholder
            autocomplete=autocomplete
            aria-describedby=described_by
            aria-invalid=move || bool_token(invalid.get())
            prop:value=move || value.get()
            disabled=move || disabled.get()
            readonly=readonly
            required=required
            data-ui-primitive="true"
            data-ui-kind="form-input"
            data-ui-disabled=move || bool_token(disabled.get())
            data-ui-invalid=move || bool_token(invalid.get())
            on:input=move |ev| {
                if let Some(on_input) = on_input.as_ref() {
                    on_input.call(ev);
                }
            }
            on:blur=move |ev| call_focus(on_blur.as_ref(), ev)
        />
    }
}

#[component]
/// Multi-line text input.
pub fn TextAreaControl(
    #[prop(into)] id: String,
    #[prop(optional, into)] name: Option<String>,
    #[prop(default = None, into)] placeholder: Option<String>,
    #[prop(default = None, into)] described_by: Option<String>,
    #[prop(optional, into)] value: MaybeSignal<String>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] invalid: MaybeSignal<bool>,
    #[prop(optional)] readonly: bool,
    #[prop(optional)] required: bool,
    #[prop(optional)] on_input: Option<Callback<web_sys::Event>>,
    #[prop(optional)] on_blur: Option<Callback<FocusEvent>>,
) -> impl IntoView {
    view! {
        <textarea
            class="ui-form-textarea"
            id=id
            name=name
            placeholder=placeholder
            aria-describedby=described_by
            aria-invalid=move || bool_token(invalid.get())
            prop:value=move || value.get()
            disabled=move || disabled.get()
            readonly=readonly
            required=required
            data-ui-primitive="true"
            data-ui-kind="form-textarea"
            data-ui-invalid=move || bool_token(invalid.get())
            on:input=move |ev| {
                if let Some(on_input) = on_input.as_ref() {
                    on_input.call(ev);
                }
            }
            on:blur=move |ev| call_focus(on_blur.as_ref(), ev)
        ></textarea>
    }
}

fn option_view(option: FieldOption) -> impl IntoView {
    view! {
        <option value=option.value disabled=option.disabled>
            {option.label}
        </option>
    }
}

#[component]
/// Drop-down choice over flat options and labeled groups.
pub fn SelectControl(
    #[prop(into)] id: String,
    #[prop(optional, into)] name: Option<String>,
    #[prop(optional)] options: Vec<FieldOption>,
    #[prop(optional)] option_groups: Vec<FieldOptionGroup>,
    /// Label of the leading empty option.
    #[prop(default = None, into)] placeholder: Option<String>,
    #[prop(default = None, into)] described_by: Option<String>,
    #[prop(optional, into)] value: MaybeSignal<String>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] invalid: MaybeSignal<bool>,
    #[prop(optional)] required: bool,
    #[prop(optional)] on_change: Option<Callback<web_sys::Event>>,
    #[prop(optional)] on_blur: Option<Callback<FocusEvent>>,
) -> impl IntoView {
    let placeholder = placeholder.unwrap_or_default();
    view! {
        <select
            class="ui-form-select"
            id=id
            name=name
            aria-describedby=described_by
            aria-invalid=move || bool_token(invalid.get())
            prop:value=move || value.get()
            disabled=move || disabled.get()
            required=required
            data-ui-primitive="true"
            data-ui-kind="form-select"
            data-ui-invalid=move || bool_token(invalid.get())
            on:change=move |ev| {
                if let Some(on_change) = on_change.as_ref() {
                    on_change.call(ev);
                }
            }
            on:blur=move |ev| call_focus(on_blur.as_ref(), ev)
        >
            <option value="">{placeholder}</option>
            {options.into_iter().map(option_view).collect_view()}
            {option_groups
                .into_iter()
                .map(|group| {
                    view! {
                        <optgroup label=group.label.unwrap_or_default()>
                            {group.options.into_iter().map(option_view).collect_view()}
                        </optgroup>
                    }
                })
                .collect_view()}
        </select>
    }
}

#[component]
/// Radio buttons sharing one `name`; reports the picked option value.
pub fn RadioGroupControl(
    #[prop(into)] name: String,
    #[prop(optional)] options: Vec<FieldOption>,
    #[prop(optional, into)] aria_label: Option<String>,
    #[prop(optional, into)] value: MaybeSignal<String>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] invalid: MaybeSignal<bool>,
    #[prop(optional)] on_change: Option<Callback<String>>,
    #[prop(optional)] on_blur: Option<Callback<FocusEvent>>,
) -> impl IntoView {
    let value = Signal::derive(move || value.get());
    view! {
        <div
            class="ui-form-radio-group"
            role="radiogroup"
            aria-label=aria_label
            aria-invalid=move || bool_token(invalid.get())
            data-ui-primitive="true"
            data-ui-kind="form-radio-group"
            data-ui-invalid=move || bool_token(invalid.get())
        >
            {options
                .into_iter()
                .map(|option| {
                    let option_value = option.value.clone();
                    let checked_value = option.value.clone();
                    let option_disabled = option.disabled;
                    view! {
                        <label data-ui-slot="option">
                            <input
                                type="radio"
                                name=name.clone()
                                value=option.value
                                prop:checked=move || value.get() == checked_value
                                disabled=move || option_disabled || disabled.get()
                                on:change=move |_| {
                                    if let Some(on_change) = on_change.as_ref() {
                                        on_change.call(option_value.clone());
                                    }
                                }
                                on:blur=move |ev| call_focus(on_blur.as_ref(), ev)
                            />
                            <span data-ui-slot="label">{option.label}</span>
                        </label>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
/// Checkbox or switch bound to a boolean.
pub fn CheckControl(
    #[prop(into)] id: String,
    #[prop(optional, into)] name: Option<String>,
    /// Renders with `role="switch"` semantics.
    #[prop(optional)] switch: bool,
    #[prop(default = None, into)] described_by: Option<String>,
    #[prop(optional, into)] checked: MaybeSignal<bool>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] invalid: MaybeSignal<bool>,
    #[prop(optional)] on_change: Option<Callback<bool>>,
    #[prop(optional)] on_blur: Option<Callback<FocusEvent>>,
) -> impl IntoView {
    view! {
        <input
            class=if switch { "ui-form-switch" } else { "ui-form-checkbox" }
            id=id
            name=name
            type="checkbox"
            role=switch.then_some("switch")
            aria-describedby=described_by
            aria-invalid=move || bool_token(invalid.get())
            prop:checked=move || checked.get()
            disabled=move || disabled.get()
            data-ui-primitive="true"
            data-ui-kind=if switch { "form-switch" } else { "form-checkbox" }
            data-ui-selected=move || bool_token(checked.get())
            data-ui-invalid=move || bool_token(invalid.get())
            on:change=move |ev| {
                if let Some(on_change) = on_change.as_ref() {
                    on_change.call(event_target_checked(&ev));
                }
            }
            on:blur=move |ev| call_focus(on_blur.as_ref(), ev)
        />
    }
}
