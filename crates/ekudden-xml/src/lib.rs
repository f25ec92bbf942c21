#![forbid(unsafe_code)]

//! XML document model for the Ekudden canonical XML library.
//!
//! Provides a small read-only DOM over an arena (`Document`, `NodeId`,
//! `NodeKind`) with parent and sibling navigation, plus a `roxmltree`
//! adapter that builds it from text.

pub mod document;
pub mod node;
pub mod parse;

pub use document::{Document, NodeId};
pub use node::{Attribute, Element, Namespace, NodeKind};
pub use parse::parsing_options;
