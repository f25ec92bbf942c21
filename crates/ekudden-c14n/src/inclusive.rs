#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.0 (C14N 1.0).
//!
//! Algorithm URI: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`
//! With comments: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments`
//!
//! The canonical form:
//! - Writes namespace declarations once, on the shallowest element that
//!   needs them, sorted by prefix
//! - Writes attributes sorted by (namespace-URI, local-name)
//! - Escapes text and attribute values per C14N rules
//! - Always writes start-end tag pairs
//! - Optionally preserves or strips comments
//!
//! Two values are threaded down the traversal: the set of prefixes already
//! declared on the path from the apex, and the default namespace in effect.
//! Every child gets its own copy of the prefix set so a declaration made
//! inside one sibling's subtree is never seen by the next sibling.

use crate::escape;
use crate::options::C14nOptions;
use crate::render::{self, NsDecl};
use crate::C14nMode;
use ekudden_core::{ns, Error};
use ekudden_xml::{Attribute, Document, Element, Namespace, NodeId, NodeKind};
use std::collections::{BTreeMap, BTreeSet};

/// Prefixes already declared on the ancestor-or-self path.
type PrefixScope = BTreeSet<String>;

/// A canonicalizer for one C14N 1.0 variant.
///
/// The comment policy is fixed at construction. A `Canonicalizer` holds no
/// per-call state and can be shared between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canonicalizer {
    mode: C14nMode,
}

impl Canonicalizer {
    pub fn new(mode: C14nMode) -> Self {
        Self { mode }
    }

    /// Plain C14N 1.0, comments stripped.
    pub fn inclusive() -> Self {
        Self::new(C14nMode::Inclusive)
    }

    /// C14N 1.0 with comments.
    pub fn with_comments() -> Self {
        Self::new(C14nMode::InclusiveWithComments)
    }

    /// Build a canonicalizer from an algorithm URI.
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        C14nMode::from_uri(uri)
            .map(Self::new)
            .ok_or_else(|| Error::UnsupportedAlgorithm(format!("canonicalization: {uri}")))
    }

    pub fn mode(&self) -> C14nMode {
        self.mode
    }

    /// The URI identifying this variant in signature metadata.
    pub fn algorithm_uri(&self) -> &'static str {
        self.mode.uri()
    }

    /// Canonicalize `node` and its descendants.
    ///
    /// `node` may be the document node, an element, a text or a comment.
    pub fn canonicalize(
        &self,
        doc: &Document,
        node: NodeId,
        options: &C14nOptions,
    ) -> Result<String, Error> {
        tracing::debug!(
            algorithm = self.algorithm_uri(),
            node = node.index(),
            ancestor_namespaces = options.ancestor_namespaces.len(),
            "canonicalizing"
        );

        let scope: PrefixScope = options
            .ancestor_namespaces
            .iter()
            .map(|n| n.prefix.clone())
            .collect();
        let ctx = C14nContext {
            doc,
            with_comments: self.mode.with_comments(),
            default_ns_for_prefix: &options.default_ns_for_prefix,
        };

        let mut output = String::new();
        ctx.process_node(
            node,
            &mut output,
            scope,
            &options.default_ns,
            &options.ancestor_namespaces,
        )?;
        Ok(output)
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::inclusive()
    }
}

struct C14nContext<'a> {
    doc: &'a Document,
    with_comments: bool,
    default_ns_for_prefix: &'a BTreeMap<String, String>,
}

impl C14nContext<'_> {
    fn process_node(
        &self,
        id: NodeId,
        output: &mut String,
        scope: PrefixScope,
        default_ns: &str,
        ancestor_ns: &[Namespace],
    ) -> Result<(), Error> {
        match self.doc.node_kind(id) {
            Some(NodeKind::Document) => {
                // The document element is the apex, so the caller's
                // ancestor declarations still apply to it.
                for child in self.doc.children(id) {
                    self.process_node(child, output, scope.clone(), default_ns, ancestor_ns)?;
                }
            }
            Some(NodeKind::Element(element)) => {
                self.process_element(id, element, output, scope, default_ns, ancestor_ns)?;
            }
            Some(NodeKind::Text(text)) => {
                output.push_str(&escape::escape_text(text));
            }
            Some(NodeKind::Comment(text)) => {
                if self.with_comments {
                    let (after_document, before_document) = self.comment_position(id);
                    if after_document {
                        output.push('\n');
                    }
                    output.push_str("<!--");
                    output.push_str(&escape::escape_text(text));
                    output.push_str("-->");
                    if before_document {
                        output.push('\n');
                    }
                }
            }
            None => {
                return Err(Error::Canonicalization(format!(
                    "no such node: {}",
                    id.index()
                )))
            }
        }
        Ok(())
    }

    fn process_element(
        &self,
        id: NodeId,
        element: &Element,
        output: &mut String,
        mut scope: PrefixScope,
        default_ns: &str,
        ancestor_ns: &[Namespace],
    ) -> Result<(), Error> {
        if element.local_name.is_empty() {
            return Err(Error::Canonicalization(format!(
                "element {} has no tag name",
                id.index()
            )));
        }
        let tag_name = element.tag_name();

        let (ns_rendered, child_default_ns) =
            self.render_namespaces(element, &mut scope, default_ns, ancestor_ns)?;

        let mut attrs: Vec<&Attribute> = element
            .attributes
            .iter()
            .filter(|a| !a.is_namespace_declaration())
            .collect();
        attrs.sort_by(|a, b| render::compare_attrs(a, b));

        output.push('<');
        output.push_str(&tag_name);
        output.push_str(&ns_rendered);
        for attr in attrs {
            output.push_str(&render::render_attr(attr));
        }
        output.push('>');

        for child in self.doc.children(id) {
            self.process_node(child, output, scope.clone(), &child_default_ns, &[])?;
        }

        output.push_str("</");
        output.push_str(&tag_name);
        output.push('>');
        Ok(())
    }

    /// Work out the namespace declarations to write on `element`.
    ///
    /// Registers every prefix it declares in `scope` and returns the rendered
    /// declarations together with the default namespace for the children.
    fn render_namespaces(
        &self,
        element: &Element,
        scope: &mut PrefixScope,
        default_ns: &str,
        ancestor_ns: &[Namespace],
    ) -> Result<(String, String), Error> {
        let mut rendered = String::new();
        let mut new_default_ns = default_ns.to_owned();
        let mut ns_to_render: Vec<NsDecl> = Vec::new();
        let current_ns = element.namespace_uri.as_deref().unwrap_or("");

        match element.prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => {
                if !scope.contains(prefix) {
                    let uri = element
                        .namespace_uri
                        .as_deref()
                        .filter(|u| !u.is_empty())
                        .or_else(|| self.default_ns_for_prefix.get(prefix).map(String::as_str))
                        .ok_or_else(|| {
                            Error::Canonicalization(format!(
                                "no namespace URI for prefix '{prefix}' on element {}",
                                element.tag_name()
                            ))
                        })?;
                    ns_to_render.push(NsDecl::new(prefix, uri));
                    scope.insert(prefix.to_owned());
                }
            }
            None => {
                if default_ns != current_ns {
                    new_default_ns = current_ns.to_owned();
                    rendered.push_str(&NsDecl::new("", current_ns).render());
                }
            }
        }

        for attr in &element.attributes {
            let prefix = attr.prefix.as_deref().unwrap_or("");

            if prefix == ns::XMLNS_PREFIX && !scope.contains(&attr.local_name) {
                ns_to_render.push(NsDecl::new(&attr.local_name, &attr.value));
                scope.insert(attr.local_name.clone());
            }

            if !prefix.is_empty()
                && prefix != ns::XMLNS_PREFIX
                && prefix != ns::XML_PREFIX
                && !scope.contains(prefix)
            {
                let uri = attr.namespace_uri.as_deref().unwrap_or("");
                ns_to_render.push(NsDecl::new(prefix, uri));
                scope.insert(prefix.to_owned());
            }
        }

        for ancestor in ancestor_ns {
            let already_listed = ns_to_render
                .iter()
                .any(|d| d.prefix == ancestor.prefix && d.uri == ancestor.uri);
            if !already_listed {
                ns_to_render.push(NsDecl::new(&ancestor.prefix, &ancestor.uri));
            }
        }

        ns_to_render.sort_by(render::compare_ns);
        for decl in &ns_to_render {
            rendered.push_str(&decl.render());
        }

        tracing::trace!(
            element = %element.tag_name(),
            declarations = ns_to_render.len(),
            default_ns = %new_default_ns,
            "rendered namespaces"
        );
        Ok((rendered, new_default_ns))
    }

    /// Where a comment sits relative to the document element.
    ///
    /// Returns `(after_document, before_document)`. Both are false unless the
    /// comment is a direct child of the document node.
    fn comment_position(&self, id: NodeId) -> (bool, bool) {
        let root = self.doc.root();
        if self.doc.parent(id) != Some(root) {
            return (false, false);
        }
        let Some(document_element) = self.doc.document_element() else {
            return (false, false);
        };

        let before = std::iter::successors(Some(id), |&n| self.doc.next_sibling(n))
            .any(|n| n == document_element);
        let after = std::iter::successors(Some(id), |&n| self.doc.prev_sibling(n))
            .any(|n| n == document_element);
        (after, before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c14n(xml: &str) -> String {
        let doc = Document::parse(xml).unwrap();
        Canonicalizer::inclusive()
            .canonicalize(&doc, doc.root(), &C14nOptions::default())
            .unwrap()
    }

    fn c14n_comments(xml: &str) -> String {
        let doc = Document::parse(xml).unwrap();
        Canonicalizer::with_comments()
            .canonicalize(&doc, doc.root(), &C14nOptions::default())
            .unwrap()
    }

    #[test]
    fn test_simple_c14n() {
        // Attributes are sorted by local name (no namespace)
        assert_eq!(
            c14n(r#"<root><a b="1" a="2"/></root>"#),
            r#"<root><a a="2" b="1"></a></root>"#
        );
    }

    #[test]
    fn test_namespace_rendering() {
        let output = c14n(r#"<root xmlns:b="http://b" xmlns:a="http://a"><a:child/></root>"#);
        assert_eq!(
            output,
            r#"<root xmlns:a="http://a" xmlns:b="http://b"><a:child></a:child></root>"#
        );
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(
            c14n(r#"<root>a &amp; b &lt; c &gt; d</root>"#),
            "<root>a &amp; b &lt; c &gt; d</root>"
        );
    }

    #[test]
    fn test_default_namespace_not_repeated() {
        assert_eq!(
            c14n(r#"<a xmlns="urn:d"><b xmlns="urn:d"><c/></b></a>"#),
            r#"<a xmlns="urn:d"><b><c></c></b></a>"#
        );
    }

    #[test]
    fn test_default_namespace_undeclared() {
        assert_eq!(
            c14n(r#"<a xmlns="urn:d"><b xmlns=""/></a>"#),
            r#"<a xmlns="urn:d"><b xmlns=""></b></a>"#
        );
    }

    #[test]
    fn test_sibling_scopes_are_independent() {
        // p is declared on each sibling; neither may rely on the other's.
        let mut doc = Document::new();
        let root = doc.root();
        let r = doc.append_element(root, Element::new("r")).unwrap();
        for name in ["one", "two"] {
            doc.append_element(
                r,
                Element::new(name).with_prefix("p").with_namespace("urn:p"),
            )
            .unwrap();
        }
        let out = Canonicalizer::inclusive()
            .canonicalize(&doc, root, &C14nOptions::default())
            .unwrap();
        assert_eq!(
            out,
            r#"<r><p:one xmlns:p="urn:p"></p:one><p:two xmlns:p="urn:p"></p:two></r>"#
        );
    }

    #[test]
    fn test_attribute_prefix_declared() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_element(
            root,
            Element::new("a").with_attribute(Attribute::namespaced("q", "k", "urn:q", "v")),
        )
        .unwrap();
        let out = Canonicalizer::inclusive()
            .canonicalize(&doc, root, &C14nOptions::default())
            .unwrap();
        assert_eq!(out, r#"<a xmlns:q="urn:q" q:k="v"></a>"#);
    }

    #[test]
    fn test_xml_prefix_never_declared() {
        assert_eq!(
            c14n(r#"<a xml:lang="en"/>"#),
            r#"<a xml:lang="en"></a>"#
        );
    }

    #[test]
    fn test_prefix_fallback_from_options() {
        let mut doc = Document::new();
        let root = doc.root();
        let el = doc
            .append_element(root, Element::new("Body").with_prefix("soap"))
            .unwrap();
        let opts = C14nOptions::new()
            .with_prefix_namespace("soap", "http://schemas.xmlsoap.org/soap/envelope/");
        let out = Canonicalizer::inclusive()
            .canonicalize(&doc, el, &opts)
            .unwrap();
        assert_eq!(
            out,
            r#"<soap:Body xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"></soap:Body>"#
        );
    }

    #[test]
    fn test_unbound_prefix_is_an_error() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_element(root, Element::new("Body").with_prefix("soap"))
            .unwrap();
        let err = Canonicalizer::inclusive()
            .canonicalize(&doc, root, &C14nOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Canonicalization(_)));
    }

    #[test]
    fn test_missing_tag_name_is_an_error() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_element(root, Element::default()).unwrap();
        let err = Canonicalizer::inclusive()
            .canonicalize(&doc, root, &C14nOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("has no tag name"));
    }

    #[test]
    fn test_comments_stripped() {
        assert_eq!(
            c14n("<!--a--><r><!--b-->x</r><!--c-->"),
            "<r>x</r>"
        );
    }

    #[test]
    fn test_comments_kept_with_position_newlines() {
        assert_eq!(
            c14n_comments("<!--a--><r><!--b-->x</r><!--c-->"),
            "<!--a-->\n<r><!--b-->x</r>\n<!--c-->"
        );
    }

    #[test]
    fn test_comment_content_escaped() {
        assert_eq!(
            c14n_comments("<r><!-- a < b & c > d --></r>"),
            "<r><!-- a &lt; b &amp; c &gt; d --></r>"
        );
    }

    #[test]
    fn test_comment_node_alone() {
        let doc = Document::parse("<!--head--><r/>").unwrap();
        let comment = doc.children(doc.root()).next().unwrap();
        let out = Canonicalizer::with_comments()
            .canonicalize(&doc, comment, &C14nOptions::default())
            .unwrap();
        assert_eq!(out, "<!--head-->\n");
        let out = Canonicalizer::inclusive()
            .canonicalize(&doc, comment, &C14nOptions::default())
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let doc = Document::parse("<r/>").unwrap();
        let other = Document::parse("<r><a/><b/></r>").unwrap();
        let foreign = other.find_element("", "b").unwrap();
        assert!(Canonicalizer::inclusive()
            .canonicalize(&doc, foreign, &C14nOptions::default())
            .is_err());
    }

    #[test]
    fn test_from_uri() {
        let c = Canonicalizer::from_uri(ekudden_core::algorithm::C14N_WITH_COMMENTS).unwrap();
        assert_eq!(c.mode(), C14nMode::InclusiveWithComments);
        assert!(matches!(
            Canonicalizer::from_uri("http://www.w3.org/2001/10/xml-exc-c14n#"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
