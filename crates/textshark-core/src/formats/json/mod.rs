//! JSON documents.
//!
//! Every element of a top-level array (or a lone top-level value) is decoded
//! into one `JsonDocument` variant before any field is read:
//! - `Layered`: search-index captures carrying `_source.layers`
//! - `Flat`: anything else, read through field aliases
//!
//! `layout` names the keys and `reader` holds the tolerant value conversions.
//! `document` builds the typed variants and `layers` normalizes layered
//! captures.

mod document;
mod layers;
mod layout;
mod parser;
mod reader;

pub use parser::parse_json;
