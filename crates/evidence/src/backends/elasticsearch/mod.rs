//! Elasticsearch backend implementation.
//!
//! Every document family lives in its own index, named
//! `{data_version}{family_index}` (e.g. `16.08_evidence-data*`). Bounded
//! queries map to `_search` with `size`/`from`; bulk scans use the scroll API
//! and clear their cursor when drained.
//!
//! Transport failures surface as [`BackendError::Unavailable`] or
//! [`BackendError::Timeout`]; error statuses and bodies that report
//! `timed_out` are never turned into empty results.
//!
//! [`BackendError::Unavailable`]: crate::error::BackendError::Unavailable
//! [`BackendError::Timeout`]: crate::error::BackendError::Timeout
//!
//! # Example
//!
//! ```ignore
//! use helios_evidence::backends::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
//! use helios_evidence::EvidenceService;
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let service = EvidenceService::new(ElasticsearchBackend::new(config)?);
//! ```

mod backend;
mod search_impl;

pub use backend::{ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig};
