#![forbid(unsafe_code)]

//! Shared rendering utilities for C14N output.
//!
//! Both orderings use plain ordinal comparison so the output does not
//! depend on the platform or locale.

use crate::escape;
use ekudden_xml::Attribute;
use std::cmp::Ordering;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// The prefix ("" for default namespace).
    pub prefix: String,
    /// The namespace URI.
    pub uri: String,
}

impl NsDecl {
    pub fn new(prefix: &str, uri: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        }
    }

    /// Render this namespace declaration to a string.
    pub fn render(&self) -> String {
        if self.prefix.is_empty() {
            format!(" xmlns=\"{}\"", escape::escape_attr(&self.uri))
        } else {
            format!(
                " xmlns:{}=\"{}\"",
                self.prefix,
                escape::escape_attr(&self.uri)
            )
        }
    }
}

/// Order namespace declarations by prefix. The empty prefix sorts first.
pub fn compare_ns(a: &NsDecl, b: &NsDecl) -> Ordering {
    a.prefix.cmp(&b.prefix)
}

/// Order attributes for output.
///
/// Attributes with no namespace come before those with a namespace. Within
/// each group, compare the namespace URI concatenated with the local name.
pub fn compare_attrs(a: &Attribute, b: &Attribute) -> Ordering {
    let a_ns = a.namespace_uri.as_deref().unwrap_or("");
    let b_ns = b.namespace_uri.as_deref().unwrap_or("");
    match (a_ns.is_empty(), b_ns.is_empty()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => {
            let left = a_ns.bytes().chain(a.local_name.bytes());
            let right = b_ns.bytes().chain(b.local_name.bytes());
            left.cmp(right)
        }
    }
}

/// Render one attribute as ` name="value"`.
pub fn render_attr(attr: &Attribute) -> String {
    format!(" {}=\"{}\"", attr.name(), escape::escape_attr(&attr.value))
}
