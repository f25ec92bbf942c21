#![forbid(unsafe_code)]

//! XML namespace constants used across the library.

/// XML namespace, implicitly bound to the `xml` prefix.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace, the namespace of `xmlns` declaration attributes.
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// Reserved prefix of the XML namespace.
pub const XML_PREFIX: &str = "xml";

/// Name (and prefix) of namespace declaration attributes.
pub const XMLNS_PREFIX: &str = "xmlns";
