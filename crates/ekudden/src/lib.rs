#![forbid(unsafe_code)]

pub use ekudden_c14n as c14n;
pub use ekudden_core as core;
pub use ekudden_xml as xml;
