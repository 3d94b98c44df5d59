//! Provider that mirrors a [`FormController`] into a reactive signal.

use form_runtime::{FormController, FormState};
use leptos::*;

#[derive(Clone, Copy)]
/// Leptos context for reading form state and reaching the controller.
pub struct FormContext {
    /// Controller owning the form state.
    pub controller: StoredValue<FormController>,
    /// Latest controller state, updated on every controller notification.
    pub state: RwSignal<FormState>,
}

impl FormContext {
    /// Handle to the controller. Clones share the same form.
    pub fn controller(&self) -> FormController {
        self.controller.get_value()
    }

    /// Current step, tracked.
    pub fn current_step(&self) -> u32 {
        self.state.with(|state| state.current_step)
    }
}

#[component]
/// Provides [`FormContext`] to descendant components.
pub fn FormProvider(
    /// Controller built from the form schema.
    controller: FormController,
    children: Children,
) -> impl IntoView {
    let state = create_rw_signal(controller.state());
    let subscription = controller.subscribe(move |next| state.set(next.clone()));
    on_cleanup(move || subscription.unsubscribe());

    provide_context(FormContext {
        controller: store_value(controller),
        state,
    });

    children().into_view()
}

/// Returns the current [`FormContext`].
///
/// # Panics
///
/// Panics if called outside [`FormProvider`].
pub fn use_form() -> FormContext {
    use_context::<FormContext>().expect("FormContext not provided")
}
