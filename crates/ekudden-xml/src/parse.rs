#![forbid(unsafe_code)]

//! Build a [`Document`] from XML text using `roxmltree`.
//!
//! roxmltree resolves namespaces but does not keep `xmlns` attributes, so
//! each element's own declarations are recovered by comparing its in-scope
//! bindings with its parent's and re-materialized as leading `xmlns`
//! attributes. Processing instructions and the DOCTYPE are dropped; CDATA
//! arrives as text.

use crate::document::{Document, NodeId};
use crate::node::{Attribute, Element, NodeKind};
use ekudden_core::{ns, Error};

/// Return roxmltree parsing options that allow DTD.
///
/// DTD is allowed because roxmltree does not expand external entities or
/// perform entity substitution beyond the five predefined XML entities
/// and internal general entities.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

impl Document {
    /// Parse XML text into a document tree.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let source = roxmltree::Document::parse_with_options(text, parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;

        let mut doc = Document::new();
        let root = doc.root();
        for child in source.root().children() {
            copy_node(&source, child, &mut doc, root)?;
        }
        tracing::debug!(nodes = doc.len(), "parsed XML document");
        Ok(doc)
    }

    /// Parse XML from bytes, which must be UTF-8.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {e}")))?;
        Self::parse(text)
    }
}

fn copy_node(
    source: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    doc: &mut Document,
    parent: NodeId,
) -> Result<(), Error> {
    match node.node_type() {
        roxmltree::NodeType::Element => {
            let element = convert_element(source, node);
            let id = doc.append_element(parent, element)?;
            for child in node.children() {
                copy_node(source, child, doc, id)?;
            }
        }
        roxmltree::NodeType::Text => {
            doc.append(parent, NodeKind::Text(node.text().unwrap_or("").to_owned()))?;
        }
        roxmltree::NodeType::Comment => {
            doc.append(parent, NodeKind::Comment(node.text().unwrap_or("").to_owned()))?;
        }
        roxmltree::NodeType::PI | roxmltree::NodeType::Root => {}
    }
    Ok(())
}

fn convert_element(source: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(tag.name());
    element.namespace_uri = tag.namespace().map(str::to_owned);
    element.prefix = element_prefix(source, node);

    for (prefix, uri) in declared_namespaces(node) {
        element
            .attributes
            .push(Attribute::namespace_declaration(prefix, uri));
    }

    for attr in node.attributes() {
        element.attributes.push(Attribute {
            local_name: attr.name().to_owned(),
            prefix: attribute_prefix(source, node, &attr),
            namespace_uri: attr.namespace().map(str::to_owned),
            value: attr.value().to_owned(),
        });
    }
    element
}

/// The prefix as written in the source start tag.
fn element_prefix(source: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> Option<String> {
    let start_tag = source.input_text().get(node.range())?;
    let qname = start_tag
        .strip_prefix('<')?
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()?;
    qname
        .split_once(':')
        .map(|(prefix, _)| prefix.to_owned())
        .filter(|p| !p.is_empty())
}

/// The prefix as written in the source, so two prefixes bound to one URI
/// stay distinct. Unprefixed attributes are never namespaced.
fn attribute_prefix(
    source: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    attr: &roxmltree::Attribute<'_, '_>,
) -> Option<String> {
    let uri = attr.namespace()?;
    if let Some(qname) = source.input_text().get(attr.range_qname()) {
        if let Some((prefix, _)) = qname.split_once(':') {
            return Some(prefix.to_owned());
        }
    }
    if uri == ns::XML {
        return Some(ns::XML_PREFIX.to_owned());
    }
    node.namespaces()
        .find(|n| n.uri() == uri && n.name().is_some())
        .and_then(|n| n.name())
        .map(str::to_owned)
}

/// Bindings in scope on `node` that its parent element does not already have.
fn declared_namespaces<'a>(node: roxmltree::Node<'a, '_>) -> Vec<(&'a str, &'a str)> {
    let parent = node.parent_element();
    node.namespaces()
        .filter(|n| n.name() != Some(ns::XML_PREFIX))
        .filter(|n| {
            parent.map_or(true, |p| {
                !p.namespaces()
                    .any(|pn| pn.name() == n.name() && pn.uri() == n.uri())
            })
        })
        .map(|n| (n.name().unwrap_or(""), n.uri()))
        .collect()
}
