//! Schema handles and the closed set of AST node kinds they wrap.

use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::annotations::{
    AnnotationKey, Annotations, DefaultAnnotation, DescriptionAnnotation, Message,
    MessageAnnotation,
};
use crate::decode::ParseIssue;

/// Predicate checked by a refinement node against an already decoded value.
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;
/// Decode step of a transformation node. `Err` carries the failure message.
pub type Decoder = Rc<dyn Fn(&Value) -> Result<Value, String>>;
/// Deferred schema constructor used for recursive shapes.
pub type Thunk = Rc<dyn Fn() -> Schema>;

/// Literal accepted by a [`AstKind::Literal`] node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Exact string.
    String(String),
    /// Exact number.
    Number(f64),
    /// Exact boolean.
    Bool(bool),
    /// JSON `null`.
    Null,
}

impl LiteralValue {
    /// Returns whether `value` equals this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String(expected), Value::String(actual)) => expected == actual,
            (Self::Number(expected), Value::Number(actual)) => actual.as_f64() == Some(*expected),
            (Self::Bool(expected), Value::Bool(actual)) => expected == actual,
            (Self::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// Converts the literal into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(text) => Value::String(text.clone()),
            Self::Number(number) => serde_json::Number::from_f64(*number)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Null => Value::Null,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::String(text) => format!("{text:?}"),
            Self::Number(number) => format_number(*number),
            Self::Bool(flag) => flag.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One declared property of an object schema.
#[derive(Clone)]
pub struct PropertySignature {
    /// Property key.
    pub name: String,
    /// Schema of the property value.
    pub schema: Schema,
    /// Whether the key may be absent.
    pub is_optional: bool,
    /// Message reported when a required key is absent.
    pub missing_message: Option<String>,
}

impl PropertySignature {
    /// Declares a property whose key must be present.
    pub fn required(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            is_optional: false,
            missing_message: None,
        }
    }

    /// Declares a property whose key may be absent.
    pub fn optional(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            is_optional: true,
            ..Self::required(name, schema)
        }
    }

    /// Overrides the message reported when the key is absent.
    pub fn with_missing_message(mut self, message: impl Into<String>) -> Self {
        self.missing_message = Some(message.into());
        self
    }
}

impl fmt::Debug for PropertySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySignature")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("is_optional", &self.is_optional)
            .finish()
    }
}

/// AST node kinds.
#[derive(Clone)]
pub enum AstKind {
    /// Any string.
    String,
    /// Any number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// One exact value.
    Literal(LiteralValue),
    /// Any value, passed through unchanged.
    Unknown,
    /// First matching member wins.
    Union(Vec<Schema>),
    /// JSON object with declared properties.
    Object(Vec<PropertySignature>),
    /// JSON array whose items share one schema.
    Array(Schema),
    /// `from` narrowed by a predicate.
    Refinement {
        /// Schema decoded before the predicate runs.
        from: Schema,
        /// Human description of what the predicate accepts.
        description: String,
        /// Predicate applied to the decoded `from` output.
        predicate: Predicate,
    },
    /// `from` decoded, converted, then decoded again as `to`.
    Transformation {
        /// Encoded side.
        from: Schema,
        /// Decoded side.
        to: Schema,
        /// Conversion between the two sides.
        decode: Decoder,
    },
    /// Schema produced on demand, for recursive shapes.
    Lazy(Thunk),
}

impl AstKind {
    /// Stable tag naming the node kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::String => "StringKeyword",
            Self::Number => "NumberKeyword",
            Self::Boolean => "BooleanKeyword",
            Self::Literal(_) => "Literal",
            Self::Unknown => "UnknownKeyword",
            Self::Union(_) => "Union",
            Self::Object(_) => "TypeLiteral",
            Self::Array(_) => "TupleType",
            Self::Refinement { .. } => "Refinement",
            Self::Transformation { .. } => "Transformation",
            Self::Lazy(_) => "Suspend",
        }
    }
}

struct Ast {
    kind: AstKind,
    annotations: Annotations,
}

/// Immutable schema node handle. Cloning shares the node.
#[derive(Clone)]
pub struct Schema(Rc<Ast>);

impl Schema {
    fn from_kind(kind: AstKind) -> Self {
        Self(Rc::new(Ast {
            kind,
            annotations: Annotations::default(),
        }))
    }

    /// Any string.
    pub fn string() -> Self {
        Self::from_kind(AstKind::String)
    }

    /// Any number.
    pub fn number() -> Self {
        Self::from_kind(AstKind::Number)
    }

    /// Any boolean.
    pub fn boolean() -> Self {
        Self::from_kind(AstKind::Boolean)
    }

    /// Any value.
    pub fn unknown() -> Self {
        Self::from_kind(AstKind::Unknown)
    }

    /// JSON `null`.
    pub fn null() -> Self {
        Self::literal(LiteralValue::Null)
    }

    /// One exact value.
    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self::from_kind(AstKind::Literal(value.into()))
    }

    /// Any of the given literals. A single literal yields a plain literal node.
    pub fn literals<I, L>(values: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LiteralValue>,
    {
        let mut members: Vec<Schema> = values.into_iter().map(Self::literal).collect();
        if members.len() == 1 {
            return members.remove(0);
        }
        Self::from_kind(AstKind::Union(members))
    }

    /// Any of the given members.
    pub fn union(members: impl IntoIterator<Item = Schema>) -> Self {
        Self::from_kind(AstKind::Union(members.into_iter().collect()))
    }

    /// `inner` or `null`.
    pub fn nullable(inner: Schema) -> Self {
        Self::union([inner, Self::null()])
    }

    /// Array of `item`.
    pub fn array(item: Schema) -> Self {
        Self::from_kind(AstKind::Array(item))
    }

    /// Object with the given declared properties.
    pub fn object(properties: impl IntoIterator<Item = PropertySignature>) -> Self {
        Self::from_kind(AstKind::Object(properties.into_iter().collect()))
    }

    /// Schema produced on demand.
    pub fn lazy(thunk: impl Fn() -> Schema + 'static) -> Self {
        Self::from_kind(AstKind::Lazy(Rc::new(thunk)))
    }

    /// Decodes `from`, converts the output with `decode`, then decodes the result as `to`.
    pub fn transform(
        from: Schema,
        to: Schema,
        decode: impl Fn(&Value) -> Result<Value, String> + 'static,
    ) -> Self {
        Self::from_kind(AstKind::Transformation {
            from,
            to,
            decode: Rc::new(decode),
        })
    }

    /// Number encoded as a string, as produced by text inputs.
    pub fn number_from_string() -> Self {
        Self::transform(Self::string(), Self::number(), |value| {
            let text = value.as_str().unwrap_or_default().trim();
            text.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("Unable to decode {text:?} into a number"))
        })
    }

    /// String with surrounding whitespace removed.
    pub fn trimmed() -> Self {
        Self::transform(Self::string(), Self::string(), |value| {
            Ok(Value::String(
                value.as_str().unwrap_or_default().trim().to_string(),
            ))
        })
    }

    /// Narrows this schema with `predicate`, described by `description` in messages.
    pub fn filter(
        &self,
        description: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + 'static,
    ) -> Self {
        Self::from_kind(AstKind::Refinement {
            from: self.clone(),
            description: description.into(),
            predicate: Rc::new(predicate),
        })
    }

    /// String with at least `min` characters.
    pub fn min_length(&self, min: usize) -> Self {
        self.filter(
            format!("a string at least {min} character(s) long"),
            move |value| string_len(value).is_some_and(|len| len >= min),
        )
    }

    /// String with at most `max` characters.
    pub fn max_length(&self, max: usize) -> Self {
        self.filter(
            format!("a string at most {max} character(s) long"),
            move |value| string_len(value).is_some_and(|len| len <= max),
        )
    }

    /// String with at least one character.
    pub fn non_empty(&self) -> Self {
        self.filter("a non empty string", |value| {
            string_len(value).is_some_and(|len| len > 0)
        })
    }

    /// String matching `pattern`.
    pub fn pattern(&self, pattern: Regex) -> Self {
        let description = format!("a string matching the pattern {}", pattern.as_str());
        self.filter(description, move |value| {
            value.as_str().is_some_and(|text| pattern.is_match(text))
        })
    }

    /// String shaped like an email address.
    pub fn email(&self) -> Self {
        self.pattern(email_pattern().clone())
            .with_description("an email address")
    }

    /// Whole number.
    pub fn int(&self) -> Self {
        self.filter("an integer", |value| {
            value.as_f64().is_some_and(|number| number.fract() == 0.0)
        })
    }

    /// Number strictly greater than `min`.
    pub fn greater_than(&self, min: f64) -> Self {
        self.filter(
            format!("a number greater than {}", format_number(min)),
            move |value| value.as_f64().is_some_and(|number| number > min),
        )
    }

    /// Number strictly less than `max`.
    pub fn less_than(&self, max: f64) -> Self {
        self.filter(
            format!("a number less than {}", format_number(max)),
            move |value| value.as_f64().is_some_and(|number| number < max),
        )
    }

    /// Number within `min..=max`.
    pub fn between(&self, min: f64, max: f64) -> Self {
        self.filter(
            format!(
                "a number between {} and {}",
                format_number(min),
                format_number(max)
            ),
            move |value| {
                value
                    .as_f64()
                    .is_some_and(|number| (min..=max).contains(&number))
            },
        )
    }

    /// Node kind.
    pub fn kind(&self) -> &AstKind {
        &self.0.kind
    }

    /// Annotations attached to this node.
    pub fn annotations(&self) -> &Annotations {
        &self.0.annotations
    }

    /// Payload stored under `K` on this node.
    pub fn annotation<K: AnnotationKey>(&self) -> Option<&K::Value> {
        self.0.annotations.get::<K>()
    }

    /// Returns a new node of the same kind carrying `payload` under `K`.
    pub fn annotate<K: AnnotationKey>(&self, payload: K::Value) -> Self {
        let mut annotations = self.0.annotations.clone();
        annotations.insert::<K>(payload);
        Self(Rc::new(Ast {
            kind: self.0.kind.clone(),
            annotations,
        }))
    }

    /// Attaches a fixed failure message.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        self.annotate::<MessageAnnotation>(Message::Text(message.into()))
    }

    /// Attaches a failure message computed from the issue.
    pub fn with_message_fn(&self, render: impl Fn(&ParseIssue) -> String + 'static) -> Self {
        self.annotate::<MessageAnnotation>(Message::Dynamic(Rc::new(render)))
    }

    /// Attaches a static default value.
    pub fn with_default(&self, value: Value) -> Self {
        self.annotate::<DefaultAnnotation>(value)
    }

    /// Attaches a description used in generated messages.
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        self.annotate::<DescriptionAnnotation>(description.into())
    }

    /// Returns whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Declared properties when this node is an object.
    pub fn properties(&self) -> Option<&[PropertySignature]> {
        match self.kind() {
            AstKind::Object(properties) => Some(properties),
            _ => None,
        }
    }

    /// Declared property named `name` when this node is an object.
    pub fn property(&self, name: &str) -> Option<&PropertySignature> {
        self.properties()?
            .iter()
            .find(|property| property.name == name)
    }

    /// Human description of the values this node accepts.
    pub fn expected(&self) -> String {
        if let Some(description) = self.annotation::<DescriptionAnnotation>() {
            return description.clone();
        }
        match self.kind() {
            AstKind::String => "string".to_string(),
            AstKind::Number => "number".to_string(),
            AstKind::Boolean => "boolean".to_string(),
            AstKind::Literal(literal) => literal.describe(),
            AstKind::Unknown => "unknown".to_string(),
            AstKind::Union(members) => members
                .iter()
                .map(Schema::expected)
                .collect::<Vec<_>>()
                .join(" | "),
            AstKind::Object(properties) => {
                let fields = properties
                    .iter()
                    .map(|property| {
                        let marker = if property.is_optional { "?" } else { "" };
                        format!("{}{marker}: {}", property.name, property.schema.expected())
                    })
                    .collect::<Vec<_>>();
                format!("{{ {} }}", fields.join("; "))
            }
            AstKind::Array(item) => format!("ReadonlyArray<{}>", item.expected()),
            AstKind::Refinement { description, .. } => description.clone(),
            AstKind::Transformation { from, to, .. } => {
                format!("({} <-> {})", from.expected(), to.expected())
            }
            AstKind::Lazy(_) => "<suspended schema>".to_string(),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("tag", &self.kind().tag())
            .field("annotations", &self.0.annotations.len())
            .finish()
    }
}

fn string_len(value: &Value) -> Option<usize> {
    value.as_str().map(|text| text.chars().count())
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern compiles")
    })
}

pub(crate) fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::decode::{decode, ParseOptions};

    #[test]
    fn annotate_returns_independent_node() {
        let base = Schema::string();
        let described = base.with_description("a user name");
        let other = base.with_description("a city");

        assert!(base.annotation::<DescriptionAnnotation>().is_none());
        assert_eq!(described.expected(), "a user name");
        assert_eq!(other.expected(), "a city");
        assert!(!described.ptr_eq(&other));
        assert!(matches!(described.kind(), AstKind::String));
    }

    #[test]
    fn literals_collapse_single_member() {
        assert!(matches!(
            Schema::literals(["only"]).kind(),
            AstKind::Literal(LiteralValue::String(_))
        ));
        assert!(matches!(
            Schema::literals(["a", "b"]).kind(),
            AstKind::Union(members) if members.len() == 2
        ));
    }

    #[test]
    fn expected_describes_shapes() {
        let schema = Schema::object([
            PropertySignature::required("name", Schema::string()),
            PropertySignature::optional("age", Schema::number()),
        ]);
        assert_eq!(schema.expected(), "{ name: string; age?: number }");
        assert_eq!(
            Schema::literals(["a", "b"]).expected(),
            "\"a\" | \"b\""
        );
        assert_eq!(
            Schema::string().min_length(3).expected(),
            "a string at least 3 character(s) long"
        );
        assert_eq!(Schema::nullable(Schema::number()).expected(), "number | null");
    }

    #[test]
    fn literal_matching_is_exact() {
        assert!(LiteralValue::from("x").matches(&json!("x")));
        assert!(!LiteralValue::from("x").matches(&json!("y")));
        assert!(LiteralValue::from(2).matches(&json!(2.0)));
        assert!(LiteralValue::Null.matches(&Value::Null));
        assert_eq!(LiteralValue::from(true).to_value(), json!(true));
    }

    #[test]
    fn email_shape_check() {
        let email = Schema::string().email();
        let accepts = |text: &str| decode(&email, &json!(text), ParseOptions::default()).is_ok();
        assert!(accepts("ada@example.com"));
        assert!(accepts("ada.lovelace@mail.example.org"));
        assert!(!accepts("ada@example"));
        assert!(!accepts("ada example@x.io"));
        assert!(!accepts("@example.com"));
        assert!(!accepts("ada@example.com."));
        assert_eq!(email.expected(), "an email address");
    }

    #[test]
    fn object_property_lookup() {
        let schema = Schema::object([PropertySignature::required("email", Schema::string())]);
        assert!(schema.property("email").is_some());
        assert!(schema.property("missing").is_none());
        assert!(Schema::string().properties().is_none());
    }
}
