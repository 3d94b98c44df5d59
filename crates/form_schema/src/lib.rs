//! Schema values, per-node annotations, and the decoder that turns candidate JSON values into
//! either decoded output or a nested parse-issue tree.
//!
//! The crate is framework-agnostic. Form layout, validation flattening, and the form state
//! machine live in `form_runtime`; this crate only knows how to describe shapes and check values
//! against them.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod annotations;
mod ast;
mod decode;

pub use annotations::{
    AnnotationKey, Annotations, DefaultAnnotation, DescriptionAnnotation, Message,
    MessageAnnotation,
};
pub use ast::{AstKind, Decoder, LiteralValue, Predicate, PropertySignature, Schema, Thunk};
pub use decode::{
    decode, format_issue, ErrorsMode, ExcessProperty, ParseIssue, ParseOptions, PathSegment,
    RefinementKind, TransformationKind,
};
