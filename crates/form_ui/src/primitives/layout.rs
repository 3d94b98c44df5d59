use super::*;

#[component]
/// Labeled wrapper around one form control with description and error slots.
pub fn FieldShell(
    #[prop(into)] control_id: String,
    #[prop(into)] label: String,
    #[prop(default = None, into)] description: Option<String>,
    /// Grid placement classes.
    #[prop(optional, into)] layout_class: Option<String>,
    #[prop(optional)] kind: Option<&'static str>,
    #[prop(optional)] required: bool,
    /// Message to display; `None` hides the error slot.
    #[prop(optional, into)] error: MaybeSignal<Option<String>>,
    children: Children,
) -> impl IntoView {
    let error = Signal::derive(move || error.get());
    let description_id = format!("{control_id}-description");
    let error_id = format!("{control_id}-error");
    view! {
        <div
            class=merge_layout_class("ui-form-field", layout_class.as_deref())
            data-ui-primitive="true"
            data-ui-kind="form-field"
            data-ui-control=kind
            data-ui-required=bool_token(required)
            data-ui-invalid=move || bool_token(error.with(Option::is_some))
        >
            <label data-ui-slot="label" for=control_id>
                {label}
                {required.then(|| view! { <span data-ui-slot="required" aria-hidden="true">"*"</span> })}
            </label>
            <div data-ui-slot="control">{children()}</div>
            {description.map(|description| {
                view! { <p data-ui-slot="description" id=description_id>{description}</p> }
            })}
            {move || {
                error
                    .get()
                    .map(|message| {
                        view! {
                            <p data-ui-slot="error" id=error_id.clone() role="alert">
                                {message}
                            </p>
                        }
                    })
            }}
        </div>
    }
}

#[component]
/// Grid container for form fields.
pub fn FormGrid(
    /// Column and gap classes.
    #[prop(optional, into)] layout_class: Option<String>,
    #[prop(default = None)] columns: Option<u8>,
    #[prop(optional)] ui_slot: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    view! {
        <div
            class=merge_layout_class("ui-form-grid", layout_class.as_deref())
            data-ui-primitive="true"
            data-ui-kind="form-grid"
            data-ui-slot=ui_slot
            data-ui-columns=columns.map(|columns| columns.to_string())
        >
            {children()}
        </div>
    }
}

#[component]
/// Titled group of fields, optionally collapsible.
pub fn SectionShell(
    #[prop(into)] section_id: String,
    #[prop(default = None, into)] title: Option<String>,
    #[prop(default = None, into)] description: Option<String>,
    #[prop(optional)] collapsible: bool,
    #[prop(optional)] default_collapsed: bool,
    children: Children,
) -> impl IntoView {
    let header = view! {
        <>
            {title.map(|title| view! { <span data-ui-slot="title">{title}</span> })}
            {description.map(|description| view! { <span data-ui-slot="description">{description}</span> })}
        </>
    };

    if collapsible {
        view! {
            <details
                class="ui-form-section"
                open=!default_collapsed
                data-ui-primitive="true"
                data-ui-kind="form-section"
                data-ui-section=section_id
                data-ui-collapsible="true"
            >
                <summary data-ui-slot="header">{header}</summary>
                <div data-ui-slot="body">{children()}</div>
            </details>
        }
        .into_view()
    } else {
        view! {
            <fieldset
                class="ui-form-section"
                data-ui-primitive="true"
                data-ui-kind="form-section"
                data-ui-section=section_id
                data-ui-collapsible="false"
            >
                <legend data-ui-slot="header">{header}</legend>
                <div data-ui-slot="body">{children()}</div>
            </fieldset>
        }
        .into_view()
    }
}
