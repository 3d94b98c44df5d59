//! Derives the render-ready field list, sections, and wizard steps from an annotated schema.

use std::collections::BTreeMap;

use form_schema::{AstKind, DefaultAnnotation, LiteralValue, PropertySignature, Schema};
use serde_json::{Map, Value};

use crate::annotations::{
    field_layout, field_ui, form_layout, ColumnSpan, FieldLayoutAnnotation, FieldOption,
    FieldOptionGroup, FieldUiAnnotation, FormLayoutConfig, InputType, LayoutGap,
};
use crate::error::FormError;

/// Order assigned to fields, sections, and steps that declare none.
pub const DEFAULT_ORDER: i32 = 999;
/// Section id of fields that declare none.
pub const DEFAULT_SECTION_ID: &str = "default";
/// Step of fields that declare none.
pub const DEFAULT_STEP: u32 = 1;

/// Largest string-literal union rendered as a radio group instead of a select.
const RADIO_OPTION_LIMIT: usize = 5;

/// Resolved projection of one schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    /// Property key.
    pub name: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub input_type: InputType,
    /// Whether the key must be present.
    pub required: bool,
    pub options: Option<Vec<FieldOption>>,
    pub option_groups: Option<Vec<FieldOptionGroup>>,
    pub mask: Option<String>,
    pub autocomplete: Option<String>,
    pub disabled: bool,
    pub readonly: bool,
    pub section: Option<String>,
    pub step: Option<u32>,
    /// Sort key; [`DEFAULT_ORDER`] when undeclared.
    pub order: i32,
    pub col_span: ColumnSpan,
    pub col_span_sm: Option<ColumnSpan>,
    pub col_span_md: Option<ColumnSpan>,
    pub col_span_lg: Option<ColumnSpan>,
    /// Static default declared on the schema.
    pub default_value: Option<Value>,
}

impl ExtractedField {
    /// Section the field is grouped under.
    pub fn section_id(&self) -> &str {
        self.section.as_deref().unwrap_or(DEFAULT_SECTION_ID)
    }

    /// Step the field is grouped under.
    pub fn step_number(&self) -> u32 {
        self.step.unwrap_or(DEFAULT_STEP)
    }
}

/// Fields sharing one section id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSection {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: i32,
    pub collapsible: bool,
    pub default_collapsed: bool,
    pub fields: Vec<ExtractedField>,
}

/// Fields sharing one wizard step, also grouped into sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedStep {
    pub step: u32,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub fields: Vec<ExtractedField>,
    pub sections: Vec<ExtractedSection>,
}

/// Complete projection of a form schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedForm {
    pub fields: Vec<ExtractedField>,
    pub sections: Vec<ExtractedSection>,
    pub steps: Vec<ExtractedStep>,
    pub layout: FormLayoutConfig,
    pub is_multi_step: bool,
}

impl ExtractedForm {
    /// Field named `name`.
    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Step numbered `step`.
    pub fn step(&self, step: u32) -> Option<&ExtractedStep> {
        self.steps.iter().find(|candidate| candidate.step == step)
    }

    /// Highest step number; [`DEFAULT_STEP`] for an empty form.
    pub fn max_step(&self) -> u32 {
        self.steps
            .iter()
            .map(|step| step.step)
            .max()
            .unwrap_or(DEFAULT_STEP)
    }
}

/// Turns a property key into a label: `firstName` and `first_name` both become "First Name".
///
/// Every capital starts a new word, so acronym runs are spelled out (`URLField` becomes
/// "U R L Field").
pub fn format_field_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Input type implied by a schema's underlying shape.
pub fn infer_input_type(schema: &Schema) -> InputType {
    match schema.kind() {
        AstKind::Boolean => InputType::Checkbox,
        AstKind::Number => InputType::Number,
        AstKind::String => InputType::Text,
        AstKind::Literal(LiteralValue::Bool(_)) => InputType::Checkbox,
        AstKind::Literal(LiteralValue::Number(_)) => InputType::Number,
        AstKind::Union(_) => match string_literals(schema) {
            Some(literals) if literals.len() <= RADIO_OPTION_LIMIT => InputType::Radio,
            Some(_) => InputType::Select,
            None => InputType::Text,
        },
        AstKind::Refinement { from, .. } | AstKind::Transformation { from, .. } => {
            infer_input_type(from)
        }
        AstKind::Lazy(thunk) => infer_input_type(&thunk()),
        _ => InputType::Text,
    }
}

/// Strips refinement, transformation, and single-member nullable wrappers.
///
/// Only used for inference and annotation lookup; required-ness always comes from the
/// property signature.
pub fn unwrap_type(schema: &Schema) -> Schema {
    match schema.kind() {
        AstKind::Union(members) => {
            let mut non_null = members
                .iter()
                .filter(|member| !matches!(member.kind(), AstKind::Literal(LiteralValue::Null)));
            match (non_null.next(), non_null.next()) {
                (Some(only), None) => only.clone(),
                _ => schema.clone(),
            }
        }
        AstKind::Refinement { from, .. } | AstKind::Transformation { from, .. } => {
            unwrap_type(from)
        }
        _ => schema.clone(),
    }
}

/// Member values when `schema` is a union made only of string literals.
fn string_literals(schema: &Schema) -> Option<Vec<String>> {
    let AstKind::Union(members) = schema.kind() else {
        return None;
    };
    members
        .iter()
        .map(|member| match member.kind() {
            AstKind::Literal(LiteralValue::String(value)) => Some(value.clone()),
            _ => None,
        })
        .collect()
}

fn literal_options(schema: &Schema) -> Option<Vec<FieldOption>> {
    let literals = match schema.kind() {
        AstKind::Union(_) => string_literals(schema),
        AstKind::Refinement { from, .. } | AstKind::Transformation { from, .. } => {
            return literal_options(from)
        }
        _ => None,
    }?;
    Some(
        literals
            .into_iter()
            .map(|value| {
                let label = format_field_name(&value);
                FieldOption::new(value, label)
            })
            .collect(),
    )
}

fn extract_field(property: &PropertySignature) -> ExtractedField {
    let unwrapped = unwrap_type(&property.schema);
    let ui = field_ui(&property.schema).or_else(|| field_ui(&unwrapped));
    let layout = field_layout(&property.schema)
        .or_else(|| field_layout(&unwrapped))
        .cloned()
        .unwrap_or_else(FieldLayoutAnnotation::default);
    let default_value = property
        .schema
        .annotation::<DefaultAnnotation>()
        .or_else(|| unwrapped.annotation::<DefaultAnnotation>())
        .cloned();

    let FieldUiAnnotation {
        label,
        placeholder,
        description,
        input_type,
        options,
        option_groups,
        mask,
        autocomplete,
        disabled,
        readonly,
    } = ui.cloned().unwrap_or_default();

    let input_type = input_type.unwrap_or_else(|| infer_input_type(&unwrapped));
    let options = match options {
        Some(options) => Some(options),
        None if input_type.is_choice() && option_groups.is_none() => literal_options(&unwrapped),
        None => None,
    };
    let label = if label.is_empty() {
        format_field_name(&property.name)
    } else {
        label
    };

    ExtractedField {
        name: property.name.clone(),
        label,
        placeholder,
        description,
        input_type,
        required: !property.is_optional,
        options,
        option_groups,
        mask,
        autocomplete,
        disabled: disabled.unwrap_or(false),
        readonly: readonly.unwrap_or(false),
        section: layout.section,
        step: layout.step,
        order: layout.order.unwrap_or(DEFAULT_ORDER),
        col_span: layout.col_span.unwrap_or_default(),
        col_span_sm: layout.col_span_sm,
        col_span_md: layout.col_span_md,
        col_span_lg: layout.col_span_lg,
        default_value,
    }
}

/// Resolves every declared field of a struct schema, sorted by ascending order.
///
/// # Errors
///
/// Returns [`FormError::NotAStruct`] when the schema root is not an object.
pub fn extract_fields(schema: &Schema) -> Result<Vec<ExtractedField>, FormError> {
    let properties = schema.properties().ok_or(FormError::NotAStruct)?;
    let mut fields: Vec<ExtractedField> = properties.iter().map(extract_field).collect();
    fields.sort_by_key(|field| field.order);
    Ok(fields)
}

/// Groups fields by section id in order of first appearance, then by section order.
pub fn group_fields_by_section(
    fields: &[ExtractedField],
    layout: &FormLayoutConfig,
) -> Vec<ExtractedSection> {
    let mut sections: Vec<ExtractedSection> = Vec::new();
    for field in fields {
        let id = field.section_id();
        if let Some(section) = sections.iter_mut().find(|section| section.id == id) {
            section.fields.push(field.clone());
            continue;
        }
        let config = layout
            .sections
            .iter()
            .flatten()
            .find(|config| config.id == id);
        sections.push(ExtractedSection {
            id: id.to_string(),
            title: config.and_then(|config| config.title.clone()),
            description: config.and_then(|config| config.description.clone()),
            order: config
                .and_then(|config| config.order)
                .unwrap_or(DEFAULT_ORDER),
            collapsible: config
                .and_then(|config| config.collapsible)
                .unwrap_or(false),
            default_collapsed: config
                .and_then(|config| config.default_collapsed)
                .unwrap_or(false),
            fields: vec![field.clone()],
        });
    }
    sections.sort_by_key(|section| section.order);
    sections
}

/// Groups fields by step number, ascending; each step is further grouped into sections.
pub fn group_fields_by_step(
    fields: &[ExtractedField],
    layout: &FormLayoutConfig,
) -> Vec<ExtractedStep> {
    let mut by_step: BTreeMap<u32, Vec<ExtractedField>> = BTreeMap::new();
    for field in fields {
        by_step
            .entry(field.step_number())
            .or_default()
            .push(field.clone());
    }

    by_step
        .into_iter()
        .map(|(step, fields)| {
            let config = layout
                .steps
                .iter()
                .flatten()
                .find(|config| config.step == step);
            ExtractedStep {
                step,
                title: config
                    .map(|config| config.title.clone())
                    .unwrap_or_else(|| format!("Step {step}")),
                description: config.and_then(|config| config.description.clone()),
                icon: config.and_then(|config| config.icon.clone()),
                sections: group_fields_by_section(&fields, layout),
                fields,
            }
        })
        .collect()
}

/// Resolves fields, sections, steps, and layout of a struct schema.
///
/// Recomputed on every call; callers cache the result when they need to.
///
/// # Errors
///
/// Returns [`FormError::NotAStruct`] when the schema root is not an object.
pub fn extract_form(schema: &Schema) -> Result<ExtractedForm, FormError> {
    let fields = extract_fields(schema)?;
    let layout = form_layout(schema)
        .cloned()
        .unwrap_or_else(FormLayoutConfig::fallback);
    let sections = group_fields_by_section(&fields, &layout);
    let steps = group_fields_by_step(&fields, &layout);
    let is_multi_step = steps.len() > 1 || layout.steps.is_some();
    Ok(ExtractedForm {
        fields,
        sections,
        steps,
        layout,
        is_multi_step,
    })
}

/// Fields placed on `step`.
pub fn fields_for_step(form: &ExtractedForm, step: u32) -> Vec<&ExtractedField> {
    form.fields
        .iter()
        .filter(|field| field.step_number() == step)
        .collect()
}

/// Fields placed in section `section_id`.
pub fn fields_for_section<'a>(form: &'a ExtractedForm, section_id: &str) -> Vec<&'a ExtractedField> {
    form.fields
        .iter()
        .filter(|field| field.section_id() == section_id)
        .collect()
}

/// Fields that render a control.
pub fn visible_fields(fields: &[ExtractedField]) -> Vec<&ExtractedField> {
    fields
        .iter()
        .filter(|field| field.input_type != InputType::Hidden)
        .collect()
}

/// Names of required fields.
pub fn required_fields(fields: &[ExtractedField]) -> Vec<&str> {
    fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name.as_str())
        .collect()
}

/// Grid span classes for a field, base span first then responsive overrides.
pub fn col_span_classes(field: &ExtractedField) -> String {
    let mut classes = vec![format!("col-span-{}", field.col_span.token())];
    for (prefix, span) in [
        ("sm", field.col_span_sm),
        ("md", field.col_span_md),
        ("lg", field.col_span_lg),
    ] {
        if let Some(span) = span {
            classes.push(format!("{prefix}:col-span-{}", span.token()));
        }
    }
    classes.join(" ")
}

/// Grid container classes for a layout.
pub fn grid_classes(layout: &FormLayoutConfig) -> String {
    let columns = layout.columns.unwrap_or(1).clamp(1, 12);
    let gap = match layout.gap.unwrap_or_default() {
        LayoutGap::None => None,
        LayoutGap::Sm => Some("gap-2"),
        LayoutGap::Md => Some("gap-4"),
        LayoutGap::Lg => Some("gap-6"),
    };
    match gap {
        Some(gap) => format!("grid grid-cols-{columns} {gap}"),
        None => format!("grid grid-cols-{columns}"),
    }
}

/// Initial values for a form: declared defaults, `false` for toggles, `""` for text-like
/// controls. Number fields without a default stay absent.
pub fn build_default_values(fields: &[ExtractedField]) -> Map<String, Value> {
    let mut values = Map::new();
    for field in fields {
        let value = match (&field.default_value, field.input_type) {
            (Some(value), _) => value.clone(),
            (None, InputType::Number) => continue,
            (None, input_type) if input_type.is_toggle() => Value::Bool(false),
            (None, _) => Value::String(String::new()),
        };
        values.insert(field.name.clone(), value);
    }
    values
}
