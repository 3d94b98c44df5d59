use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One entry of a [`StepNav`].
pub struct StepNavItem {
    /// Step number.
    pub step: u32,
    /// Display title.
    pub title: String,
    /// Optional secondary copy.
    pub description: Option<String>,
}

#[component]
/// Wizard progress list; steps up to the current one are selectable.
pub fn StepNav(
    items: Vec<StepNavItem>,
    #[prop(into)] current: Signal<u32>,
    #[prop(optional, into)] aria_label: Option<String>,
    #[prop(optional)] on_select: Option<Callback<u32>>,
) -> impl IntoView {
    view! {
        <ol
            class="ui-step-nav"
            aria-label=aria_label
            data-ui-primitive="true"
            data-ui-kind="step-nav"
        >
            {items
                .into_iter()
                .map(|item| {
                    let step = item.step;
                    let status = move || StepStatus::of(step, current.get());
                    view! {
                        <li data-ui-slot="step" data-ui-state=move || status().token()>
                            <button
                                type="button"
                                aria-current=move || (status() == StepStatus::Active).then_some("step")
                                disabled=move || status() == StepStatus::Upcoming
                                on:click=move |_| {
                                    if let Some(on_select) = on_select.as_ref() {
                                        on_select.call(step);
                                    }
                                }
                            >
                                <span data-ui-slot="badge">{step}</span>
                                <span data-ui-slot="title">{item.title}</span>
                                {item
                                    .description
                                    .map(|description| {
                                        view! { <span data-ui-slot="description">{description}</span> }
                                    })}
                            </button>
                        </li>
                    }
                })
                .collect_view()}
        </ol>
    }
}

#[component]
/// Form action button: previous, next, submit, reset.
pub fn ActionButton(
    #[prop(optional)] variant: ActionVariant,
    /// `button`, `submit`, or `reset`.
    #[prop(default = "button")]
    button_type: &'static str,
    #[prop(optional)] ui_slot: Option<&'static str>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] busy: MaybeSignal<bool>,
    #[prop(optional)] on_click: Option<Callback<MouseEvent>>,
    children: Children,
) -> impl IntoView {
    view! {
        <button
            type=button_type
            class="ui-form-action"
            disabled=move || disabled.get() || busy.get()
            aria-busy=move || bool_token(busy.get())
            data-ui-primitive="true"
            data-ui-kind="form-action"
            data-ui-slot=ui_slot
            data-ui-variant=variant.token()
            data-ui-disabled=move || bool_token(disabled.get())
            on:click=move |ev| call_click(on_click.as_ref(), ev)
        >
            {children()}
        </button>
    }
}
