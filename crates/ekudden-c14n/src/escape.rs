#![forbid(unsafe_code)]

//! Character references used in canonical output.
//!
//! Text and comment content replace `&`, `<`, `>` and carriage returns.
//! Attribute values (and namespace URIs) replace `&`, `<`, `"` and the three
//! whitespace controls tab, LF and CR; `>` passes through untouched.

/// Text node and comment content.
pub fn escape_text(s: &str) -> String {
    replace_chars(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

/// Attribute values, rendered between double quotes.
pub fn escape_attr(s: &str) -> String {
    replace_chars(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#x9;"),
        '\n' => Some("&#xA;"),
        '\r' => Some("&#xD;"),
        _ => None,
    })
}

fn replace_chars(s: &str, reference: impl Fn(char) -> Option<&'static str>) -> String {
    // Fast path: most names and values need no references at all.
    if !s.chars().any(|ch| reference(ch).is_some()) {
        return s.to_owned();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match reference(ch) {
            Some(r) => out.push_str(r),
            None => out.push(ch),
        }
    }
    out
}
