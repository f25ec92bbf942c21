#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for the Ekudden library.
//!
//! Implements Canonical XML 1.0 with and without comments over the
//! read-only tree from `ekudden-xml`. The output is the byte sequence a
//! signer or verifier feeds to its digest function.

pub mod escape;
pub mod inclusive;
pub mod options;
pub mod render;

pub use inclusive::Canonicalizer;
pub use options::C14nOptions;

use ekudden_core::{algorithm, Error};
use ekudden_xml::{Document, NodeId};

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum C14nMode {
    /// Canonical XML 1.0
    #[default]
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments)
    }

    /// Every supported mode.
    pub fn all() -> [Self; 2] {
        [Self::Inclusive, Self::InclusiveWithComments]
    }
}

/// Canonicalize an XML document given as text.
pub fn canonicalize(xml: &str, mode: C14nMode) -> Result<Vec<u8>, Error> {
    let doc = Document::parse(xml)?;
    canonicalize_doc(&doc, mode)
}

/// Convenience: canonicalize a whole pre-built document.
pub fn canonicalize_doc(doc: &Document, mode: C14nMode) -> Result<Vec<u8>, Error> {
    Canonicalizer::new(mode)
        .canonicalize(doc, doc.root(), &C14nOptions::default())
        .map(String::into_bytes)
}

/// Canonicalize the subtree at `node` as a detached fragment.
///
/// The prefixed namespace declarations `node` inherits from its ancestors
/// are collected and rendered on it.
pub fn canonicalize_fragment(doc: &Document, node: NodeId, mode: C14nMode) -> Result<Vec<u8>, Error> {
    let options = C14nOptions::new().with_ancestor_namespaces(doc.ancestor_namespaces(node));
    Canonicalizer::new(mode)
        .canonicalize(doc, node, &options)
        .map(String::into_bytes)
}
