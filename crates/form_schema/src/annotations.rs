//! Typed metadata attached to individual schema nodes.
//!
//! Annotations never change how a node decodes. Attaching one produces a new node that shares
//! the source node's kind and children, so two nodes of the same shape can carry different
//! metadata and be queried independently.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::decode::ParseIssue;

/// Key type identifying one annotation slot and the payload stored under it.
///
/// Keys are usually zero-sized marker structs:
///
/// ```
/// use form_schema::AnnotationKey;
///
/// struct HelpTextKey;
///
/// impl AnnotationKey for HelpTextKey {
///     type Value = String;
/// }
/// ```
pub trait AnnotationKey: 'static {
    /// Payload stored for this key.
    type Value: 'static;
}

/// Per-node annotation table keyed by [`AnnotationKey`] type.
#[derive(Clone, Default)]
pub struct Annotations {
    entries: HashMap<TypeId, Rc<dyn Any>>,
}

impl Annotations {
    /// Returns the payload stored under `K`, if any.
    pub fn get<K: AnnotationKey>(&self) -> Option<&K::Value> {
        self.entries
            .get(&TypeId::of::<K>())
            .and_then(|entry| (**entry).downcast_ref::<K::Value>())
    }

    /// Stores `value` under `K`, replacing any previous payload.
    pub fn insert<K: AnnotationKey>(&mut self, value: K::Value) {
        self.entries.insert(TypeId::of::<K>(), Rc::new(value));
    }

    /// Returns whether a payload is stored under `K`.
    pub fn contains<K: AnnotationKey>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<K>())
    }

    /// Number of annotation slots in use.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no annotation is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotations")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Custom error message attached to a node.
#[derive(Clone)]
pub enum Message {
    /// Fixed message text.
    Text(String),
    /// Message computed from the failing issue.
    Dynamic(Rc<dyn Fn(&ParseIssue) -> String>),
}

impl Message {
    /// Renders the message for `issue`.
    pub fn render(&self, issue: &ParseIssue) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Dynamic(render) => render(issue),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Custom failure message for a node.
pub struct MessageAnnotation;

impl AnnotationKey for MessageAnnotation {
    type Value = Message;
}

/// Static default value declared for a node.
pub struct DefaultAnnotation;

impl AnnotationKey for DefaultAnnotation {
    type Value = Value;
}

/// Human description replacing the generated "expected" text of a node.
pub struct DescriptionAnnotation;

impl AnnotationKey for DescriptionAnnotation {
    type Value = String;
}
