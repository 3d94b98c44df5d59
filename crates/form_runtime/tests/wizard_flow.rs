use std::cell::{Cell, RefCell};
use std::rc::Rc;

use form_runtime::{
    section_context, step_context, FieldLayoutAnnotation, FieldUiAnnotation, FormConfig,
    FormController, FormLayoutConfig, InputType, LayoutGap, SchemaFormExt, SectionConfig,
    StepConfig,
};
use form_schema::{PropertySignature, Schema};
use futures::executor::block_on;
use serde_json::{json, Value};

fn placed(schema: Schema, section: &str, step: u32, order: i32) -> Schema {
    schema.with_field_layout(
        FieldLayoutAnnotation::default()
            .section(section)
            .step(step)
            .order(order),
    )
}

fn signup_schema() -> Schema {
    Schema::object([
        PropertySignature::required(
            "email",
            placed(
                Schema::string()
                    .email()
                    .with_message("Enter a valid email")
                    .with_field_ui(FieldUiAnnotation::new("Email").input_type(InputType::Email)),
                "account",
                1,
                1,
            ),
        ),
        PropertySignature::required(
            "password",
            placed(
                Schema::string()
                    .min_length(8)
                    .with_message("Use at least 8 characters")
                    .with_field_ui(
                        FieldUiAnnotation::new("Password").input_type(InputType::Password),
                    ),
                "account",
                1,
                2,
            ),
        ),
        PropertySignature::required(
            "plan",
            placed(Schema::literals(["free", "team", "enterprise"]), "billing", 2, 1),
        ),
        PropertySignature::optional(
            "seats",
            placed(Schema::number().int().between(1.0, 500.0), "billing", 2, 2),
        ),
        PropertySignature::required("acceptTerms", placed(Schema::boolean(), "billing", 3, 1)),
    ])
    .with_form_layout(FormLayoutConfig {
        sections: Some(vec![
            SectionConfig::new("account").title("Account").order(1),
            SectionConfig::new("billing").title("Billing").order(2),
        ]),
        steps: Some(vec![
            StepConfig::new(1, "Account"),
            StepConfig::new(2, "Plan"),
            StepConfig::new(3, "Confirm"),
        ]),
        columns: Some(2),
        gap: Some(LayoutGap::Lg),
    })
}

#[test]
fn wizard_walks_every_step_and_submits() {
    let form = FormController::new(signup_schema(), FormConfig::default()).expect("struct schema");
    assert!(form.form().is_multi_step);
    assert_eq!(form.max_step(), 3);
    assert_eq!(
        form.state().values_json(),
        json!({ "email": "", "password": "", "plan": "", "acceptTerms": false })
    );

    let notifications = Rc::new(Cell::new(0));
    let counter = Rc::clone(&notifications);
    let subscription = form.subscribe(move |_| counter.set(counter.get() + 1));

    // Step 1 blocks until both account fields are valid.
    assert!(!form.next_step());
    let state = form.state();
    assert_eq!(state.current_step, 1);
    assert_eq!(state.error("email"), Some("This field is required"));
    assert_eq!(state.error("password"), Some("This field is required"));
    assert_eq!(state.error("plan"), None);

    form.set_value("email", json!("not-an-email"));
    assert_eq!(form.state().error("email"), Some("Enter a valid email"));
    form.set_value("email", json!("ada@example.com"));
    form.set_value("password", json!("correct horse"));
    assert!(form.next_step());

    let step_two = form.form().step(2).cloned().expect("step two");
    let context = step_context(&form, &step_two);
    assert!(context.is_active);
    assert_eq!(context.step.title, "Plan");
    assert_eq!(context.sections[0].section.id, "billing");
    assert_eq!(context.sections[0].grid_class, "grid grid-cols-2 gap-6");
    let plan = &context.sections[0].fields[0];
    assert_eq!(plan.field.input_type, InputType::Radio);
    assert_eq!(plan.field.options.as_ref().map(Vec::len), Some(3));

    (plan.on_change)(json!("team"));
    assert!(form.next_step());
    assert_eq!(form.state().current_step, 3);
    assert!(!form.next_step());

    form.set_value("acceptTerms", json!(true));
    let received = RefCell::new(None);
    let submitted = block_on(form.submit(|data| {
        *received.borrow_mut() = Some(data);
        async { Ok::<(), String>(()) }
    }));
    assert_eq!(submitted, Ok(true));
    assert_eq!(
        received.into_inner(),
        Some(json!({
            "email": "ada@example.com",
            "password": "correct horse",
            "plan": "team",
            "acceptTerms": true
        }))
    );

    let state = form.state();
    assert!(state.is_valid);
    assert!(!state.is_submitting);
    assert_eq!(state.submit_count, 1);
    assert!(notifications.get() > 0);
    subscription.unsubscribe();
}

#[test]
fn server_errors_and_reset() {
    let form = FormController::new(
        signup_schema(),
        FormConfig {
            initial_values: Some(
                json!({
                    "email": "ada@example.com",
                    "password": "correct horse",
                    "plan": "free",
                    "acceptTerms": true
                })
                .as_object()
                .cloned()
                .expect("object"),
            ),
            ..FormConfig::default()
        },
    )
    .expect("struct schema");

    let submitted = block_on(form.submit(|_| async { Err("email already registered") }));
    assert_eq!(submitted, Err("email already registered"));
    assert!(!form.state().is_submitting);

    form.set_field_error("email", "Already registered");
    assert!(form.should_show_error("email"));
    let account = form.form().sections[0].clone();
    let context = section_context(&form, &account);
    assert_eq!(
        context.fields[0].error.as_deref(),
        Some("Already registered")
    );

    form.go_to_step(3);
    form.reset(None);
    let state = form.state();
    assert_eq!(state.current_step, 1);
    assert_eq!(state.submit_count, 0);
    assert!(state.errors.is_empty());
    assert_eq!(state.value("plan"), Some(&Value::from("free")));
}

#[test]
fn out_of_range_seats_are_reported() {
    let form = FormController::new(signup_schema(), FormConfig::default()).expect("struct schema");
    form.set_value("seats", json!(0));
    assert_eq!(
        form.state().error("seats"),
        Some("Expected a number between 1 and 500, actual 0")
    );
    form.set_value("seats", json!(12));
    assert_eq!(form.state().error("seats"), None);
}
