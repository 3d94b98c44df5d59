//! UI and layout metadata attached to schema fields and to the form schema itself.
//!
//! Payloads are stored in the schema's per-node annotation table, so attaching them never
//! changes validation behavior. Every payload is a plain serde type and can be loaded from
//! configuration as well as built in code.

use form_schema::{AnnotationKey, Schema};
use serde::{Deserialize, Serialize};

/// Input control used to render a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Single-line text.
    #[default]
    Text,
    /// Email address.
    Email,
    /// Masked password.
    Password,
    /// Telephone number.
    Tel,
    /// URL.
    Url,
    /// Numeric input.
    Number,
    /// Multi-line text.
    Textarea,
    /// Drop-down choice.
    Select,
    /// Searchable choice.
    Combobox,
    /// Single checkbox.
    Checkbox,
    /// Toggle switch.
    Switch,
    /// Radio group.
    Radio,
    /// Date picker.
    Date,
    /// Date and time picker.
    Datetime,
    /// File picker.
    File,
    /// Not rendered.
    Hidden,
}

impl InputType {
    /// Stable token used in the rendered DOM contract.
    pub fn token(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Combobox => "combobox",
            Self::Checkbox => "checkbox",
            Self::Switch => "switch",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::File => "file",
            Self::Hidden => "hidden",
        }
    }

    /// Whether the control toggles a boolean.
    pub fn is_toggle(self) -> bool {
        matches!(self, Self::Checkbox | Self::Switch)
    }

    /// Whether the control picks one of several options.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Combobox | Self::Radio)
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Submitted value.
    pub value: String,
    /// Displayed label.
    pub label: String,
    /// Whether the option can be picked.
    #[serde(default)]
    pub disabled: bool,
}

impl FieldOption {
    /// Enabled option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

/// Labeled group of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptionGroup {
    /// Group heading.
    #[serde(default)]
    pub label: Option<String>,
    /// Grouped options.
    pub options: Vec<FieldOption>,
}

/// Presentation metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldUiAnnotation {
    pub label: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    pub options: Option<Vec<FieldOption>>,
    pub option_groups: Option<Vec<FieldOptionGroup>>,
    pub mask: Option<String>,
    pub autocomplete: Option<String>,
    pub disabled: Option<bool>,
    pub readonly: Option<bool>,
}

impl FieldUiAnnotation {
    /// Annotation with only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
        self.options = Some(options.into_iter().collect());
        self
    }

    pub fn autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }
}

/// Grid column span on a 12-column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "ColumnSpanRepr", into = "ColumnSpanRepr")]
pub enum ColumnSpan {
    /// Explicit column count in `1..=12`.
    Columns(u8),
    /// Entire row.
    #[default]
    Full,
}

impl ColumnSpan {
    /// Span of `columns`, clamped to `1..=12`.
    pub fn cols(columns: u8) -> Self {
        Self::Columns(columns.clamp(1, 12))
    }

    /// Class-name token (`"6"`, `"full"`).
    pub fn token(self) -> String {
        match self {
            Self::Columns(columns) => columns.to_string(),
            Self::Full => "full".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ColumnSpanRepr {
    Columns(u8),
    Keyword(String),
}

impl TryFrom<ColumnSpanRepr> for ColumnSpan {
    type Error = String;

    fn try_from(repr: ColumnSpanRepr) -> Result<Self, Self::Error> {
        match repr {
            ColumnSpanRepr::Columns(columns @ 1..=12) => Ok(Self::Columns(columns)),
            ColumnSpanRepr::Columns(columns) => {
                Err(format!("column span {columns} is outside 1..=12"))
            }
            ColumnSpanRepr::Keyword(keyword) if keyword == "full" => Ok(Self::Full),
            ColumnSpanRepr::Keyword(keyword) => Err(format!("unknown column span `{keyword}`")),
        }
    }
}

impl From<ColumnSpan> for ColumnSpanRepr {
    fn from(span: ColumnSpan) -> Self {
        match span {
            ColumnSpan::Columns(columns) => Self::Columns(columns),
            ColumnSpan::Full => Self::Keyword("full".to_string()),
        }
    }
}

/// Placement metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldLayoutAnnotation {
    pub section: Option<String>,
    pub step: Option<u32>,
    pub order: Option<i32>,
    pub col_span: Option<ColumnSpan>,
    pub col_span_sm: Option<ColumnSpan>,
    pub col_span_md: Option<ColumnSpan>,
    pub col_span_lg: Option<ColumnSpan>,
}

impl FieldLayoutAnnotation {
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn col_span(mut self, span: ColumnSpan) -> Self {
        self.col_span = Some(span);
        self
    }
}

/// Presentation and placement metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldAnnotation {
    /// Presentation part.
    #[serde(flatten)]
    pub ui: FieldUiAnnotation,
    /// Placement part.
    #[serde(flatten)]
    pub layout: FieldLayoutAnnotation,
}

/// Metadata for one named section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionConfig {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub collapsible: Option<bool>,
    pub default_collapsed: Option<bool>,
}

impl SectionConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

/// Metadata for one wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub step: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl StepConfig {
    pub fn new(step: u32, title: impl Into<String>) -> Self {
        Self {
            step,
            title: title.into(),
            description: None,
            icon: None,
        }
    }
}

/// Spacing between grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutGap {
    /// No spacing.
    None,
    /// Dense spacing.
    Sm,
    /// Default spacing.
    #[default]
    Md,
    /// Loose spacing.
    Lg,
}

impl LayoutGap {
    /// Stable token used in the rendered DOM contract.
    pub fn token(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
        }
    }
}

/// Form-wide layout attached to the schema root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormLayoutConfig {
    pub sections: Option<Vec<SectionConfig>>,
    pub steps: Option<Vec<StepConfig>>,
    pub columns: Option<u8>,
    pub gap: Option<LayoutGap>,
}

impl FormLayoutConfig {
    /// Layout used when the schema declares none: one column, medium gap.
    pub fn fallback() -> Self {
        Self {
            columns: Some(1),
            gap: Some(LayoutGap::Md),
            ..Self::default()
        }
    }
}

/// Annotation slot for [`FieldUiAnnotation`].
pub struct FieldUiKey;

impl AnnotationKey for FieldUiKey {
    type Value = FieldUiAnnotation;
}

/// Annotation slot for [`FieldLayoutAnnotation`].
pub struct FieldLayoutKey;

impl AnnotationKey for FieldLayoutKey {
    type Value = FieldLayoutAnnotation;
}

/// Annotation slot for [`FormLayoutConfig`].
pub struct FormLayoutKey;

impl AnnotationKey for FormLayoutKey {
    type Value = FormLayoutConfig;
}

/// Chainable form annotation helpers for [`Schema`].
pub trait SchemaFormExt {
    /// Attaches presentation metadata.
    fn with_field_ui(&self, annotation: FieldUiAnnotation) -> Schema;
    /// Attaches placement metadata.
    fn with_field_layout(&self, annotation: FieldLayoutAnnotation) -> Schema;
    /// Attaches both parts of a combined annotation.
    fn with_field(&self, annotation: FieldAnnotation) -> Schema;
    /// Attaches the form-wide layout to a struct schema.
    fn with_form_layout(&self, config: FormLayoutConfig) -> Schema;
}

impl SchemaFormExt for Schema {
    fn with_field_ui(&self, annotation: FieldUiAnnotation) -> Schema {
        self.annotate::<FieldUiKey>(annotation)
    }

    fn with_field_layout(&self, annotation: FieldLayoutAnnotation) -> Schema {
        self.annotate::<FieldLayoutKey>(annotation)
    }

    fn with_field(&self, annotation: FieldAnnotation) -> Schema {
        self.annotate::<FieldUiKey>(annotation.ui)
            .annotate::<FieldLayoutKey>(annotation.layout)
    }

    fn with_form_layout(&self, config: FormLayoutConfig) -> Schema {
        self.annotate::<FormLayoutKey>(config)
    }
}

/// Presentation metadata attached directly to `schema`.
pub fn field_ui(schema: &Schema) -> Option<&FieldUiAnnotation> {
    schema.annotation::<FieldUiKey>()
}

/// Placement metadata attached directly to `schema`.
pub fn field_layout(schema: &Schema) -> Option<&FieldLayoutAnnotation> {
    schema.annotation::<FieldLayoutKey>()
}

/// Form-wide layout attached directly to `schema`.
pub fn form_layout(schema: &Schema) -> Option<&FormLayoutConfig> {
    schema.annotation::<FormLayoutKey>()
}

/// Combined metadata, or `None` when neither part is attached.
pub fn field_annotation(schema: &Schema) -> Option<FieldAnnotation> {
    let ui = field_ui(schema);
    let layout = field_layout(schema);
    if ui.is_none() && layout.is_none() {
        return None;
    }
    Some(FieldAnnotation {
        ui: ui.cloned().unwrap_or_default(),
        layout: layout.cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn annotations_are_per_node() {
        let base = Schema::string();
        let first = base.with_field_ui(FieldUiAnnotation::new("First"));
        let second = base.with_field_ui(FieldUiAnnotation::new("Second"));

        assert!(field_ui(&base).is_none());
        assert_eq!(field_ui(&first).map(|ui| ui.label.as_str()), Some("First"));
        assert_eq!(field_ui(&second).map(|ui| ui.label.as_str()), Some("Second"));
    }

    #[test]
    fn with_field_splits_into_both_slots() {
        let schema = Schema::string().with_field(FieldAnnotation {
            ui: FieldUiAnnotation::new("Email").input_type(InputType::Email),
            layout: FieldLayoutAnnotation::default().section("contact").order(2),
        });

        assert_eq!(
            field_ui(&schema).and_then(|ui| ui.input_type),
            Some(InputType::Email)
        );
        assert_eq!(
            field_layout(&schema).and_then(|layout| layout.section.as_deref()),
            Some("contact")
        );
        let combined = field_annotation(&schema).expect("combined annotation");
        assert_eq!(combined.layout.order, Some(2));
    }

    #[test]
    fn field_annotation_absent_when_unannotated() {
        assert!(field_annotation(&Schema::number()).is_none());
        let layout_only =
            Schema::number().with_field_layout(FieldLayoutAnnotation::default().step(2));
        let combined = field_annotation(&layout_only).expect("layout part");
        assert_eq!(combined.ui.label, "");
        assert_eq!(combined.layout.step, Some(2));
    }

    #[test]
    fn annotating_does_not_change_decoding() {
        let plain = Schema::string().min_length(2);
        let annotated = plain.with_field_ui(FieldUiAnnotation::new("Name"));
        let options = form_schema::ParseOptions::default();
        assert!(form_schema::decode(&annotated, &json!("a"), options).is_err());
        assert!(form_schema::decode(&annotated, &json!("ab"), options).is_ok());
    }

    #[test]
    fn column_span_round_trips_through_config() {
        let layout: FieldLayoutAnnotation = serde_json::from_value(json!({
            "section": "address",
            "colSpan": 6,
            "colSpanLg": "full"
        }))
        .expect("layout config");
        assert_eq!(layout.col_span, Some(ColumnSpan::Columns(6)));
        assert_eq!(layout.col_span_lg, Some(ColumnSpan::Full));

        let rejected = serde_json::from_value::<FieldLayoutAnnotation>(json!({ "colSpan": 13 }));
        assert!(rejected.is_err());
        assert_eq!(ColumnSpan::cols(40), ColumnSpan::Columns(12));
    }

    #[test]
    fn form_layout_loads_from_json() {
        let config: FormLayoutConfig = serde_json::from_value(json!({
            "columns": 2,
            "gap": "lg",
            "steps": [{ "step": 1, "title": "Account" }],
            "sections": [{ "id": "personal", "title": "Personal", "defaultCollapsed": true }]
        }))
        .expect("form layout");
        assert_eq!(config.gap, Some(LayoutGap::Lg));
        assert_eq!(config.steps.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            config.sections.as_ref().and_then(|s| s[0].default_collapsed),
            Some(true)
        );
    }
}
