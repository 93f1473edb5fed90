//! Helios Evidence Query Engine
//!
//! This crate serves gene–disease evidence records out of a document search
//! index. It turns high-level lookups and filter intents into backend
//! queries, enriches the returned evidence with gene and disease metadata,
//! and wraps everything in one paginated envelope that renders as JSON, XML
//! or CSV.
//!
//! # Features
//!
//! - **Filter composition**: gene, disease and evidence-type sets, each with
//!   its own `AND`/`OR`/`NOT` operator, with identifier alias expansion
//! - **Lookup fallback**: gene lookups retry by symbol when no id matches
//! - **Batch enrichment**: one mapping lookup and one metadata lookup per
//!   kind per page, never one per record
//! - **Bulk scans**: full-corpus aggregation over a scroll cursor
//! - **Output formats**: JSON, XML and CSV from the same structured shape
//!
//! # Backend Features
//!
//! - `elasticsearch` (default) - Elasticsearch 8 via the official client
//!
//! # Architecture
//!
//! - [`config`] - Index names per document family
//! - [`types`] - Request options, filters, documents and the result envelope
//! - [`error`] - Error types for all operations
//! - [`core`] - The [`SearchBackend`](core::SearchBackend) trait and scans
//! - [`search`] - Query composition
//! - [`enrichment`] - Gene/EFO metadata join
//! - [`service`] - The operations callers use
//! - [`output`] - XML and CSV rendering
//! - [`backends`] - Backend implementations
//!
//! # Quick Start
//!
//! ```ignore
//! use helios_evidence::backends::elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
//! use helios_evidence::types::{RawSearchParams, SearchParams};
//! use helios_evidence::EvidenceService;
//!
//! let service = EvidenceService::new(ElasticsearchBackend::new(ElasticsearchConfig::default())?);
//! let params = SearchParams::from_raw(&RawSearchParams {
//!     size: Some("20".to_string()),
//!     ..Default::default()
//! });
//!
//! let result = service.evidence_for_gene("BRCA1", &params).await?;
//! println!("{}", result.render()?);
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod config;
pub mod core;
pub mod enrichment;
pub mod error;
pub mod output;
pub mod schema;
pub mod search;
pub mod service;
pub mod types;

pub use config::{DocumentFamily, IndexConfig};
pub use error::{BackendError, EvidenceError, EvidenceResult};
pub use service::{EvidenceService, Vocabulary};
