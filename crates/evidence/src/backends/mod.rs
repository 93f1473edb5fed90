//! Search backend implementations.
//!
//! Each backend is behind a feature flag:
//!
//! - `elasticsearch` (default) - Elasticsearch 8 via the official client

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
