//! Leptos rendering layer for schema-driven forms.
//!
//! [`FormProvider`] mirrors a [`form_runtime::FormController`] into a reactive
//! signal; [`SchemaForm`] and its parts render the extracted layout through
//! field and navigation primitives that emit the stable `data-ui-*` DOM
//! contract. Field values, errors, and step changes all flow through the
//! controller, so the same form can be driven headless in tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod context;
mod primitives;
mod schema_form;

pub use context::{use_form, FormContext, FormProvider};
pub use primitives::{
    ActionButton, ActionVariant, CheckControl, FieldShell, FormGrid, InputControl,
    RadioGroupControl, SectionShell, SelectControl, StepNav, StepNavItem, StepStatus,
    TextAreaControl,
};
pub use schema_form::{SchemaField, SchemaForm, SchemaSection, SchemaStep, SubmitHandler};

/// Convenience imports for application crates rendering schema forms.
pub mod prelude {
    pub use crate::{
        use_form, FormContext, FormProvider, SchemaField, SchemaForm, SchemaSection, SchemaStep,
        SubmitHandler,
    };
    pub use form_runtime::{FormConfig, FormController, SchemaFormExt};
}
