#![forbid(unsafe_code)]

//! Node payloads: elements, attributes, text and comments.

use ekudden_core::ns;
use std::borrow::Cow;

/// The closed set of node kinds the canonicalizer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node. Its children are the top-level comments and the
    /// document element.
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element: its name, namespace and ordered attribute list.
///
/// Namespace declarations are carried as ordinary attributes named
/// `xmlns` or `xmlns:<prefix>`, the way a DOM exposes them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub local_name: String,
    pub prefix: Option<String>,
    pub namespace_uri: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Create an unprefixed element in no namespace.
    pub fn new(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_owned(),
            ..Default::default()
        }
    }

    /// Set the element's namespace prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_owned());
        self
    }

    /// Set the element's namespace URI.
    pub fn with_namespace(mut self, uri: &str) -> Self {
        self.namespace_uri = Some(uri.to_owned());
        self
    }

    /// Append an attribute.
    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    /// Append a namespace declaration attribute (`""` declares the default namespace).
    pub fn declare_namespace(self, prefix: &str, uri: &str) -> Self {
        self.with_attribute(Attribute::namespace_declaration(prefix, uri))
    }

    /// The qualified tag name, `prefix:local` or `local`.
    pub fn tag_name(&self) -> Cow<'_, str> {
        qualify(self.prefix.as_deref(), &self.local_name)
    }

    /// Get the value of the first attribute with the given qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.value.as_str())
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attribute {
    pub local_name: String,
    pub prefix: Option<String>,
    pub namespace_uri: Option<String>,
    pub value: String,
}

impl Attribute {
    /// An unprefixed attribute in no namespace.
    pub fn new(local_name: &str, value: &str) -> Self {
        Self {
            local_name: local_name.to_owned(),
            value: value.to_owned(),
            ..Default::default()
        }
    }

    /// A prefixed attribute in the namespace `uri`.
    pub fn namespaced(prefix: &str, local_name: &str, uri: &str, value: &str) -> Self {
        Self {
            local_name: local_name.to_owned(),
            prefix: Some(prefix.to_owned()),
            namespace_uri: Some(uri.to_owned()),
            value: value.to_owned(),
        }
    }

    /// A namespace declaration: `xmlns="uri"` for the empty prefix,
    /// `xmlns:prefix="uri"` otherwise.
    pub fn namespace_declaration(prefix: &str, uri: &str) -> Self {
        if prefix.is_empty() {
            Self {
                local_name: ns::XMLNS_PREFIX.to_owned(),
                prefix: None,
                namespace_uri: Some(ns::XMLNS.to_owned()),
                value: uri.to_owned(),
            }
        } else {
            Self::namespaced(ns::XMLNS_PREFIX, prefix, ns::XMLNS, uri)
        }
    }

    /// The qualified attribute name.
    pub fn name(&self) -> Cow<'_, str> {
        qualify(self.prefix.as_deref(), &self.local_name)
    }

    /// Whether this attribute is a namespace declaration (its name starts with `xmlns`).
    pub fn is_namespace_declaration(&self) -> bool {
        self.name().starts_with(ns::XMLNS_PREFIX)
    }
}

/// A namespace binding: prefix (`""` for the default namespace) and URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: &str, uri: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        }
    }
}

fn qualify<'a>(prefix: Option<&str>, local_name: &'a str) -> Cow<'a, str> {
    match prefix {
        Some(p) if !p.is_empty() => Cow::Owned(format!("{p}:{local_name}")),
        _ => Cow::Borrowed(local_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name() {
        assert_eq!(Element::new("root").tag_name(), "root");
        let el = Element::new("Signature").with_prefix("ds");
        assert_eq!(el.tag_name(), "ds:Signature");
    }

    #[test]
    fn test_namespace_declaration_names() {
        let default = Attribute::namespace_declaration("", "urn:a");
        assert_eq!(default.name(), "xmlns");
        assert!(default.is_namespace_declaration());

        let prefixed = Attribute::namespace_declaration("x", "urn:x");
        assert_eq!(prefixed.name(), "xmlns:x");
        assert_eq!(prefixed.local_name, "x");
        assert_eq!(prefixed.prefix.as_deref(), Some("xmlns"));
        assert!(prefixed.is_namespace_declaration());

        assert!(!Attribute::new("id", "1").is_namespace_declaration());
    }

    #[test]
    fn test_attribute_lookup() {
        let el = Element::new("a")
            .declare_namespace("x", "urn:x")
            .with_attribute(Attribute::namespaced("x", "attr", "urn:x", "1"));
        assert_eq!(el.attribute("x:attr"), Some("1"));
        assert_eq!(el.attribute("xmlns:x"), Some("urn:x"));
        assert_eq!(el.attribute("attr"), None);
    }
}
