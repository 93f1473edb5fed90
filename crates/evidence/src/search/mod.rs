//! Query composition.
//!
//! Translates lookups, filter sets and free-text phrases into backend query
//! bodies.

pub mod alias;
pub mod filter_composer;
pub mod fts;
pub mod query_builder;

pub use alias::IdentifierNamespace;
pub use fts::FreeTextScope;
