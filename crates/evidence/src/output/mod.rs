//! Text renderings of results.
//!
//! JSON comes straight from `serde_json`; the modules here derive the XML and
//! CSV forms from the same structured shape.

pub mod csv;
pub mod xml;
