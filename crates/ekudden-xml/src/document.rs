#![forbid(unsafe_code)]

//! Arena-backed XML document.
//!
//! All nodes live in one `Vec` owned by the [`Document`] and are addressed by
//! [`NodeId`]. Parent and sibling links are stored per node so that both
//! downward traversal and the sibling walks needed for top-level comments
//! are O(1) per step. Lookups never panic: an unknown id yields `None`.

use crate::node::{Element, Namespace, NodeKind};
use ekudden_core::{ns, Error};
use std::collections::BTreeMap;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An XML document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create a document containing only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The single top-level element, if one has been added.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root()).find(|&id| self.is_element(id))
    }

    pub fn node_kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    /// The element payload of `id`, or `None` for other kinds.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.node_kind(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.prev_sibling)
    }

    /// Iterate over the children of `id` in document order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.nodes.get(id.0).and_then(|n| n.first_child),
        }
    }

    /// Iterate over the ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mark = stack.len();
            stack.extend(self.children(current));
            stack[mark..].reverse();
        }
        out
    }

    /// Number of nodes, including the document node.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document always holds its document node, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Append a new node as the last child of `parent`.
    ///
    /// Only the document node and elements can have children, and a
    /// document node cannot be nested.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, Error> {
        match self.node_kind(parent) {
            Some(NodeKind::Document) | Some(NodeKind::Element(_)) => {}
            Some(_) => {
                return Err(Error::XmlStructure(format!(
                    "node {} cannot have children",
                    parent.0
                )))
            }
            None => return Err(Error::XmlStructure(format!("no such node: {}", parent.0))),
        }
        if matches!(kind, NodeKind::Document) {
            return Err(Error::XmlStructure(
                "a document node cannot be a child".into(),
            ));
        }

        let id = NodeId(self.nodes.len());
        let mut data = NodeData::new(kind);
        data.parent = Some(parent);
        data.prev_sibling = self.nodes[parent.0].last_child;
        self.nodes.push(data);

        match self.nodes[parent.0].last_child {
            Some(last) => self.nodes[last.0].next_sibling = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        self.nodes[parent.0].last_child = Some(id);
        Ok(id)
    }

    pub fn append_element(&mut self, parent: NodeId, element: Element) -> Result<NodeId, Error> {
        self.append(parent, NodeKind::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, Error> {
        self.append(parent, NodeKind::Text(text.to_owned()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> Result<NodeId, Error> {
        self.append(parent, NodeKind::Comment(text.to_owned()))
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Find the first descendant element with the given local name and namespace.
    pub fn find_element(&self, ns: &str, local_name: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.matches_name(id, ns, local_name))
    }

    /// Find all descendant elements with the given local name and namespace.
    pub fn find_elements(&self, ns: &str, local_name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.matches_name(id, ns, local_name))
            .collect()
    }

    fn matches_name(&self, id: NodeId, ns: &str, local_name: &str) -> bool {
        self.element(id).is_some_and(|el| {
            el.local_name == local_name && el.namespace_uri.as_deref().unwrap_or("") == ns
        })
    }

    /// Collect the prefixed namespace declarations inherited by `id` from
    /// its ancestor elements.
    ///
    /// The nearest declaration of a prefix wins. Prefixes that `id` declares
    /// itself are left out, as is the default namespace. The result is
    /// sorted by prefix and is meant for canonicalizing `id` as a detached
    /// fragment.
    pub fn ancestor_namespaces(&self, id: NodeId) -> Vec<Namespace> {
        let own: Vec<&str> = self
            .element(id)
            .map(|el| {
                el.attributes
                    .iter()
                    .filter(|a| a.prefix.as_deref() == Some(ns::XMLNS_PREFIX))
                    .map(|a| a.local_name.as_str())
                    .collect()
            })
            .unwrap_or_default();

        let mut found: BTreeMap<&str, &str> = BTreeMap::new();
        for ancestor in self.ancestors(id) {
            let Some(el) = self.element(ancestor) else {
                continue;
            };
            for attr in &el.attributes {
                if attr.prefix.as_deref() != Some(ns::XMLNS_PREFIX) {
                    continue;
                }
                let prefix = attr.local_name.as_str();
                if own.contains(&prefix) {
                    continue;
                }
                found.entry(prefix).or_insert(attr.value.as_str());
            }
        }

        found
            .into_iter()
            .map(|(prefix, uri)| Namespace::new(prefix, uri))
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attribute;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let before = doc.append_comment(root, " head ").unwrap();
        let el = doc
            .append_element(root, Element::new("root").declare_namespace("a", "urn:a"))
            .unwrap();
        let after = doc.append_comment(root, " tail ").unwrap();
        (doc, before, el, after)
    }

    #[test]
    fn test_sibling_links() {
        let (doc, before, el, after) = sample();
        assert_eq!(doc.document_element(), Some(el));
        assert_eq!(doc.next_sibling(before), Some(el));
        assert_eq!(doc.prev_sibling(after), Some(el));
        assert_eq!(doc.prev_sibling(before), None);
        assert_eq!(doc.next_sibling(after), None);
        assert_eq!(doc.parent(el), Some(doc.root()));
        assert_eq!(doc.children(doc.root()).count(), 3);
    }

    #[test]
    fn test_append_to_text_fails() {
        let mut doc = Document::new();
        let root = doc.root();
        let el = doc.append_element(root, Element::new("a")).unwrap();
        let text = doc.append_text(el, "hello").unwrap();
        assert!(doc.append_text(text, "nope").is_err());
        assert!(doc.append(root, NodeKind::Document).is_err());
        assert!(doc.append_text(NodeId(99), "nope").is_err());
    }

    #[test]
    fn test_descendants_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, Element::new("a")).unwrap();
        let b = doc.append_element(a, Element::new("b")).unwrap();
        let c = doc.append_element(b, Element::new("c")).unwrap();
        let d = doc.append_element(a, Element::new("d")).unwrap();
        assert_eq!(doc.descendants(root), vec![a, b, c, d]);
        assert_eq!(doc.descendants(b), vec![c]);
    }

    #[test]
    fn test_find_element() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, Element::new("a")).unwrap();
        let sig = doc
            .append_element(
                a,
                Element::new("Signature")
                    .with_prefix("ds")
                    .with_namespace("http://www.w3.org/2000/09/xmldsig#"),
            )
            .unwrap();
        assert_eq!(
            doc.find_element("http://www.w3.org/2000/09/xmldsig#", "Signature"),
            Some(sig)
        );
        assert_eq!(doc.find_element("", "Signature"), None);
        assert_eq!(doc.find_elements("", "a"), vec![a]);
    }

    #[test]
    fn test_ancestor_namespaces() {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc
            .append_element(
                root,
                Element::new("outer")
                    .declare_namespace("", "urn:default")
                    .declare_namespace("b", "urn:b-outer")
                    .declare_namespace("a", "urn:a"),
            )
            .unwrap();
        let middle = doc
            .append_element(
                outer,
                Element::new("middle")
                    .declare_namespace("b", "urn:b-inner")
                    .declare_namespace("c", "urn:c"),
            )
            .unwrap();
        let inner = doc
            .append_element(
                middle,
                Element::new("inner")
                    .declare_namespace("c", "urn:c-own")
                    .with_attribute(Attribute::new("id", "x")),
            )
            .unwrap();

        assert_eq!(
            doc.ancestor_namespaces(inner),
            vec![Namespace::new("a", "urn:a"), Namespace::new("b", "urn:b-inner")]
        );
        assert!(doc.ancestor_namespaces(outer).is_empty());
    }
}
