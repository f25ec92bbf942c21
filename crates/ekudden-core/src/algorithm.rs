#![forbid(unsafe_code)]

//! Algorithm URI constants.
//!
//! Each constant is the exact URI string that identifies a canonicalization
//! method in signature metadata (`CanonicalizationMethod/@Algorithm`).

// ── Canonicalization ─────────────────────────────────────────────────

pub const C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const C14N_WITH_COMMENTS: &str =
    "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
