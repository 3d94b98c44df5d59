//! Decoding candidate values against a schema and the issue tree produced on failure.

use std::fmt;

use serde_json::{Map, Value};

use crate::annotations::MessageAnnotation;
use crate::ast::{AstKind, Schema};

/// How many issues the decoder gathers before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorsMode {
    /// Stop at the first issue.
    #[default]
    First,
    /// Keep going and report every issue.
    All,
}

/// Handling of object keys that no property declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcessProperty {
    /// Drop them from the output.
    #[default]
    Ignore,
    /// Report each one as a [`ParseIssue::Forbidden`].
    Error,
    /// Copy them to the output unchanged.
    Preserve,
}

/// Decoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Issue collection mode.
    pub errors: ErrorsMode,
    /// Excess object key handling.
    pub on_excess_property: ExcessProperty,
}

impl ParseOptions {
    /// Options that gather every issue.
    pub fn all_errors() -> Self {
        Self {
            errors: ErrorsMode::All,
            ..Self::default()
        }
    }

    /// Options that stop at the first issue.
    pub fn first_error() -> Self {
        Self::default()
    }

    fn stop_early(self) -> bool {
        self.errors == ErrorsMode::First
    }
}

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Which part of a refinement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementKind {
    /// The refined schema itself rejected the value.
    From,
    /// The predicate rejected the decoded value.
    Predicate,
}

/// Which stage of a transformation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformationKind {
    /// The encoded side rejected the input.
    Encoded,
    /// The conversion function failed.
    Transformation,
    /// The decoded side rejected the converted value.
    Type,
}

/// Nested description of what failed during decoding and where.
#[derive(Debug, Clone)]
pub enum ParseIssue {
    /// Value has the wrong shape for `ast`.
    Type {
        /// Node that rejected the value.
        ast: Schema,
        /// Rejected value.
        actual: Value,
        /// Message from the node's annotation, if any.
        message: Option<String>,
    },
    /// Required key is absent.
    Missing {
        /// Schema of the absent property.
        ast: Schema,
        /// Message declared on the property, if any.
        message: Option<String>,
    },
    /// Key is present but not allowed.
    Forbidden {
        /// Value found under the key.
        actual: Value,
        /// Custom message, if any.
        message: Option<String>,
    },
    /// Issue located one step deeper.
    Pointer {
        /// Step into the parent value.
        path: PathSegment,
        /// Parent value.
        actual: Value,
        /// Nested issue.
        issue: Box<ParseIssue>,
    },
    /// Several issues sharing one location.
    Composite {
        /// Node that gathered the issues.
        ast: Schema,
        /// Value at this location.
        actual: Value,
        /// Gathered issues.
        issues: Vec<ParseIssue>,
    },
    /// Refinement failure.
    Refinement {
        /// Refinement node.
        ast: Schema,
        /// Value at this location.
        actual: Value,
        /// Failing part.
        kind: RefinementKind,
        /// Underlying issue.
        issue: Box<ParseIssue>,
    },
    /// Transformation failure.
    Transformation {
        /// Transformation node.
        ast: Schema,
        /// Value at this location.
        actual: Value,
        /// Failing stage.
        kind: TransformationKind,
        /// Underlying issue.
        issue: Box<ParseIssue>,
    },
}

impl ParseIssue {
    /// Stable tag naming the issue kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Type { .. } => "Type",
            Self::Missing { .. } => "Missing",
            Self::Forbidden { .. } => "Forbidden",
            Self::Pointer { .. } => "Pointer",
            Self::Composite { .. } => "Composite",
            Self::Refinement { .. } => "Refinement",
            Self::Transformation { .. } => "Transformation",
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_issue(self))
    }
}

/// Decodes `input` against `schema`.
///
/// # Errors
///
/// Returns the issue tree describing every failure (or only the first, under
/// [`ErrorsMode::First`]).
pub fn decode(schema: &Schema, input: &Value, options: ParseOptions) -> Result<Value, ParseIssue> {
    match schema.kind() {
        AstKind::String => accept_if(schema, input, input.is_string()),
        AstKind::Number => accept_if(schema, input, input.is_number()),
        AstKind::Boolean => accept_if(schema, input, input.is_boolean()),
        AstKind::Literal(literal) => accept_if(schema, input, literal.matches(input)),
        AstKind::Unknown => Ok(input.clone()),
        AstKind::Union(members) => decode_union(schema, members, input, options),
        AstKind::Object(_) => decode_object(schema, input, options),
        AstKind::Array(item) => decode_array(schema, item, input, options),
        AstKind::Refinement {
            from, predicate, ..
        } => {
            let decoded =
                decode(from, input, options).map_err(|issue| ParseIssue::Refinement {
                    ast: schema.clone(),
                    actual: input.clone(),
                    kind: RefinementKind::From,
                    issue: Box::new(issue),
                })?;
            if predicate(&decoded) {
                Ok(decoded)
            } else {
                Err(ParseIssue::Refinement {
                    ast: schema.clone(),
                    actual: input.clone(),
                    kind: RefinementKind::Predicate,
                    issue: Box::new(type_issue(schema, &decoded)),
                })
            }
        }
        AstKind::Transformation { from, to, decode: convert } => {
            let transformation_issue = |kind, issue| ParseIssue::Transformation {
                ast: schema.clone(),
                actual: input.clone(),
                kind,
                issue: Box::new(issue),
            };
            let encoded = decode(from, input, options)
                .map_err(|issue| transformation_issue(TransformationKind::Encoded, issue))?;
            let converted = convert(&encoded).map_err(|message| {
                transformation_issue(
                    TransformationKind::Transformation,
                    ParseIssue::Type {
                        ast: schema.clone(),
                        actual: encoded.clone(),
                        message: Some(message),
                    },
                )
            })?;
            decode(to, &converted, options)
                .map_err(|issue| transformation_issue(TransformationKind::Type, issue))
        }
        AstKind::Lazy(thunk) => decode(&thunk(), input, options),
    }
}

fn accept_if(schema: &Schema, input: &Value, accepted: bool) -> Result<Value, ParseIssue> {
    if accepted {
        Ok(input.clone())
    } else {
        Err(type_issue(schema, input))
    }
}

fn type_issue(schema: &Schema, actual: &Value) -> ParseIssue {
    let mut issue = ParseIssue::Type {
        ast: schema.clone(),
        actual: actual.clone(),
        message: None,
    };
    if let Some(annotation) = schema.annotation::<MessageAnnotation>() {
        let rendered = annotation.render(&issue);
        if let ParseIssue::Type { message, .. } = &mut issue {
            *message = Some(rendered);
        }
    }
    issue
}

fn decode_union(
    schema: &Schema,
    members: &[Schema],
    input: &Value,
    options: ParseOptions,
) -> Result<Value, ParseIssue> {
    let candidates: Vec<&Schema> = members
        .iter()
        .filter(|member| accepts_shape(member, input))
        .collect();
    if candidates.is_empty() {
        return Err(type_issue(schema, input));
    }

    let mut issues = Vec::new();
    for candidate in candidates {
        match decode(candidate, input, options) {
            Ok(decoded) => return Ok(decoded),
            Err(issue) => issues.push(issue),
        }
    }
    Err(ParseIssue::Composite {
        ast: schema.clone(),
        actual: input.clone(),
        issues,
    })
}

/// Cheap structural pre-check used to pick union candidates.
fn accepts_shape(schema: &Schema, value: &Value) -> bool {
    match schema.kind() {
        AstKind::String => value.is_string(),
        AstKind::Number => value.is_number(),
        AstKind::Boolean => value.is_boolean(),
        AstKind::Literal(literal) => literal.matches(value),
        AstKind::Unknown => true,
        AstKind::Union(members) => members.iter().any(|member| accepts_shape(member, value)),
        AstKind::Object(_) => value.is_object(),
        AstKind::Array(_) => value.is_array(),
        AstKind::Refinement { from, .. } | AstKind::Transformation { from, .. } => {
            accepts_shape(from, value)
        }
        AstKind::Lazy(thunk) => accepts_shape(&thunk(), value),
    }
}

fn decode_object(schema: &Schema, input: &Value, options: ParseOptions) -> Result<Value, ParseIssue> {
    let (Value::Object(entries), Some(properties)) = (input, schema.properties()) else {
        return Err(type_issue(schema, input));
    };

    let mut output = Map::new();
    let mut issues = Vec::new();

    for property in properties {
        let issue = match entries.get(&property.name) {
            None if property.is_optional => None,
            None => Some(ParseIssue::Missing {
                ast: property.schema.clone(),
                message: property.missing_message.clone(),
            }),
            Some(value) => match decode(&property.schema, value, options) {
                Ok(decoded) => {
                    output.insert(property.name.clone(), decoded);
                    None
                }
                Err(issue) => Some(issue),
            },
        };
        if let Some(issue) = issue {
            issues.push(ParseIssue::Pointer {
                path: PathSegment::Key(property.name.clone()),
                actual: input.clone(),
                issue: Box::new(issue),
            });
            if options.stop_early() {
                break;
            }
        }
    }

    if issues.is_empty() || !options.stop_early() {
        let excess = entries
            .iter()
            .filter(|(key, _)| !properties.iter().any(|property| &property.name == *key));
        for (key, value) in excess {
            match options.on_excess_property {
                ExcessProperty::Ignore => {}
                ExcessProperty::Preserve => {
                    output.insert(key.clone(), value.clone());
                }
                ExcessProperty::Error => {
                    issues.push(ParseIssue::Pointer {
                        path: PathSegment::Key(key.clone()),
                        actual: input.clone(),
                        issue: Box::new(ParseIssue::Forbidden {
                            actual: value.clone(),
                            message: None,
                        }),
                    });
                    if options.stop_early() {
                        break;
                    }
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(ParseIssue::Composite {
            ast: schema.clone(),
            actual: input.clone(),
            issues,
        })
    }
}

fn decode_array(
    schema: &Schema,
    item: &Schema,
    input: &Value,
    options: ParseOptions,
) -> Result<Value, ParseIssue> {
    let Value::Array(items) = input else {
        return Err(type_issue(schema, input));
    };

    let mut output = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, value) in items.iter().enumerate() {
        match decode(item, value, options) {
            Ok(decoded) => output.push(decoded),
            Err(issue) => {
                issues.push(ParseIssue::Pointer {
                    path: PathSegment::Index(index),
                    actual: input.clone(),
                    issue: Box::new(issue),
                });
                if options.stop_early() {
                    break;
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(Value::Array(output))
    } else {
        Err(ParseIssue::Composite {
            ast: schema.clone(),
            actual: input.clone(),
            issues,
        })
    }
}

/// Renders an issue tree as a single line of text.
///
/// Custom messages attached to refinement nodes take precedence over generated text.
pub fn format_issue(issue: &ParseIssue) -> String {
    match issue {
        ParseIssue::Type {
            ast,
            actual,
            message,
        } => message
            .clone()
            .unwrap_or_else(|| format!("Expected {}, actual {actual}", ast.expected())),
        ParseIssue::Missing { message, .. } => {
            message.clone().unwrap_or_else(|| "is missing".to_string())
        }
        ParseIssue::Forbidden { message, .. } => {
            message.clone().unwrap_or_else(|| "is unexpected".to_string())
        }
        ParseIssue::Pointer { path, issue, .. } => {
            format!("[{:?}] {}", path.to_string(), format_issue(issue))
        }
        ParseIssue::Composite { issues, .. } => issues
            .iter()
            .map(format_issue)
            .collect::<Vec<_>>()
            .join("; "),
        ParseIssue::Refinement {
            ast, kind, issue, ..
        } => match (ast.annotation::<MessageAnnotation>(), kind) {
            (Some(annotation), RefinementKind::Predicate) => annotation.render(issue),
            _ => format_issue(issue),
        },
        ParseIssue::Transformation { issue, .. } => format_issue(issue),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::ast::PropertySignature;

    fn user() -> Schema {
        Schema::object([
            PropertySignature::required("name", Schema::string().min_length(2)),
            PropertySignature::required("age", Schema::number().int()),
            PropertySignature::optional("nickname", Schema::string()),
        ])
    }

    fn pointer_keys(issue: &ParseIssue) -> Vec<String> {
        match issue {
            ParseIssue::Composite { issues, .. } => issues
                .iter()
                .filter_map(|issue| match issue {
                    ParseIssue::Pointer { path, .. } => Some(path.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn decodes_valid_object_and_drops_excess_keys() {
        let decoded = decode(
            &user(),
            &json!({ "name": "Ada", "age": 36, "extra": true }),
            ParseOptions::all_errors(),
        )
        .expect("valid user");
        assert_eq!(decoded, json!({ "name": "Ada", "age": 36 }));
    }

    #[test]
    fn all_mode_collects_every_property_issue() {
        let issue = decode(&user(), &json!({ "name": "A" }), ParseOptions::all_errors())
            .expect_err("invalid user");
        assert_eq!(issue.tag(), "Composite");
        assert_eq!(pointer_keys(&issue), vec!["name", "age"]);
    }

    #[test]
    fn first_mode_stops_after_first_issue() {
        let issue = decode(&user(), &json!({ "name": "A" }), ParseOptions::first_error())
            .expect_err("invalid user");
        assert_eq!(pointer_keys(&issue), vec!["name"]);
    }

    #[test]
    fn missing_required_key_is_missing_issue() {
        let issue = decode(&user(), &json!({ "age": 3 }), ParseOptions::all_errors())
            .expect_err("missing name");
        let ParseIssue::Composite { issues, .. } = issue else {
            panic!("expected composite");
        };
        let ParseIssue::Pointer { issue, .. } = &issues[0] else {
            panic!("expected pointer");
        };
        assert_eq!(issue.tag(), "Missing");
    }

    #[test]
    fn excess_property_error_reports_forbidden() {
        let options = ParseOptions {
            errors: ErrorsMode::All,
            on_excess_property: ExcessProperty::Error,
        };
        let issue = decode(
            &user(),
            &json!({ "name": "Ada", "age": 1, "admin": true }),
            options,
        )
        .expect_err("excess key");
        assert_eq!(pointer_keys(&issue), vec!["admin"]);
        assert_eq!(format_issue(&issue), "[\"admin\"] is unexpected");
    }

    #[test]
    fn excess_property_preserve_keeps_keys() {
        let options = ParseOptions {
            on_excess_property: ExcessProperty::Preserve,
            ..ParseOptions::default()
        };
        let decoded = decode(&user(), &json!({ "name": "Ada", "age": 1, "x": 2 }), options)
            .expect("valid");
        assert_eq!(decoded["x"], json!(2));
    }

    #[test]
    fn refinement_predicate_failure_formats_expected_text() {
        let issue = decode(
            &Schema::string().min_length(8),
            &json!("abc"),
            ParseOptions::default(),
        )
        .expect_err("too short");
        assert!(matches!(
            issue,
            ParseIssue::Refinement {
                kind: RefinementKind::Predicate,
                ..
            }
        ));
        assert_eq!(
            format_issue(&issue),
            "Expected a string at least 8 character(s) long, actual \"abc\""
        );
    }

    #[test]
    fn refinement_from_failure_wraps_type_issue() {
        let issue = decode(&Schema::string().min_length(2), &json!(4), ParseOptions::default())
            .expect_err("not a string");
        let ParseIssue::Refinement { kind, issue, .. } = issue else {
            panic!("expected refinement");
        };
        assert_eq!(kind, RefinementKind::From);
        assert_eq!(issue.tag(), "Type");
    }

    #[test]
    fn custom_message_wins_in_formatter() {
        let schema = Schema::string()
            .min_length(8)
            .with_message("Password must be at least 8 characters");
        let issue =
            decode(&schema, &json!("short"), ParseOptions::default()).expect_err("too short");
        assert_eq!(format_issue(&issue), "Password must be at least 8 characters");
    }

    #[test]
    fn union_without_candidates_is_type_issue() {
        let schema = Schema::literals(["red", "green"]);
        let issue = decode(&schema, &json!("blue"), ParseOptions::default()).expect_err("no match");
        assert_eq!(issue.tag(), "Type");
        assert_eq!(
            format_issue(&issue),
            "Expected \"red\" | \"green\", actual \"blue\""
        );
    }

    #[test]
    fn union_with_failing_candidates_is_composite() {
        let schema = Schema::union([Schema::string().min_length(3), Schema::number()]);
        assert_eq!(
            decode(&schema, &json!(7), ParseOptions::default()).expect("number member"),
            json!(7)
        );
        let issue = decode(&schema, &json!("ab"), ParseOptions::default()).expect_err("too short");
        assert_eq!(issue.tag(), "Composite");
    }

    #[test]
    fn transformation_decodes_and_reports_stage() {
        let schema = Schema::number_from_string();
        assert_eq!(
            decode(&schema, &json!(" 42 "), ParseOptions::default()).expect("numeric text"),
            json!(42.0)
        );

        let issue = decode(&schema, &json!("forty"), ParseOptions::default())
            .expect_err("not numeric");
        assert!(matches!(
            issue,
            ParseIssue::Transformation {
                kind: TransformationKind::Transformation,
                ..
            }
        ));

        let issue = decode(&schema, &json!(42), ParseOptions::default()).expect_err("not text");
        assert!(matches!(
            issue,
            ParseIssue::Transformation {
                kind: TransformationKind::Encoded,
                ..
            }
        ));
    }

    #[test]
    fn array_items_are_pointed_by_index() {
        let schema = Schema::array(Schema::string());
        let issue = decode(&schema, &json!(["a", 1, "c", 2]), ParseOptions::all_errors())
            .expect_err("mixed array");
        assert_eq!(pointer_keys(&issue), vec!["1", "3"]);
    }

    #[test]
    fn lazy_schema_supports_recursion() {
        fn category() -> Schema {
            Schema::object([
                PropertySignature::required("name", Schema::string()),
                PropertySignature::required("children", Schema::array(Schema::lazy(category))),
            ])
        }

        let value = json!({
            "name": "root",
            "children": [{ "name": "leaf", "children": [] }]
        });
        assert_eq!(
            decode(&category(), &value, ParseOptions::default()).expect("tree"),
            value
        );
        assert!(decode(
            &category(),
            &json!({ "name": "root", "children": [{ "name": 1, "children": [] }] }),
            ParseOptions::default()
        )
        .is_err());
    }

    #[test]
    fn non_object_input_for_object_schema_is_type_issue() {
        let issue = decode(&user(), &json!("nope"), ParseOptions::default()).expect_err("string");
        assert_eq!(issue.tag(), "Type");
    }
}
