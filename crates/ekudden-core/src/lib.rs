#![forbid(unsafe_code)]

//! Shared building blocks for the Ekudden canonical XML library.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
