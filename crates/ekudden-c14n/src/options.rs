#![forbid(unsafe_code)]

//! Namespace context supplied by the caller.

use ekudden_xml::Namespace;
use std::collections::BTreeMap;

/// The namespace context in effect above the node being canonicalized.
///
/// All fields default to empty, which is right for canonicalizing a whole
/// document. Fragments cut out of a larger document carry the context of
/// their ancestors here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct C14nOptions {
    /// The default namespace URI assumed in effect above the node.
    pub default_ns: String,
    /// Fallback URIs for prefixed elements that carry no namespace URI.
    pub default_ns_for_prefix: BTreeMap<String, String>,
    /// Declarations inherited from outside the subtree. Rendered on the
    /// topmost element and treated as already in scope below it.
    pub ancestor_namespaces: Vec<Namespace>,
}

impl C14nOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_ns(mut self, uri: &str) -> Self {
        self.default_ns = uri.to_owned();
        self
    }

    pub fn with_prefix_namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.default_ns_for_prefix
            .insert(prefix.to_owned(), uri.to_owned());
        self
    }

    pub fn with_ancestor_namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.ancestor_namespaces.push(Namespace::new(prefix, uri));
        self
    }

    pub fn with_ancestor_namespaces(mut self, namespaces: Vec<Namespace>) -> Self {
        self.ancestor_namespaces = namespaces;
        self
    }
}
