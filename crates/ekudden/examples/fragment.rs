//! Canonicalize a signed element cut out of a larger SOAP envelope.

use ekudden::c14n::{canonicalize_fragment, C14nMode};
use ekudden::xml::Document;

const ENVELOPE: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <soap:Body wsu:Id="body">
    <order   qty="2" sku="A-1"/>
  </soap:Body>
</soap:Envelope>"#;

fn main() -> Result<(), ekudden::core::Error> {
    let doc = Document::parse(ENVELOPE)?;
    let body = doc
        .find_element("http://schemas.xmlsoap.org/soap/envelope/", "Body")
        .ok_or_else(|| ekudden::core::Error::XmlStructure("no soap:Body".into()))?;
    let canonical = canonicalize_fragment(&doc, body, C14nMode::Inclusive)?;
    println!("{}", String::from_utf8_lossy(&canonical));
    Ok(())
}
