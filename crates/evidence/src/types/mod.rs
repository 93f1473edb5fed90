//! Request, filter and result types.
//!
//! - [`SearchParams`] - normalized request options
//! - [`FilterSet`], [`BooleanOperator`] - per-dimension filter intents
//! - [`Evidence`], [`GeneInfo`], [`EfoInfo`] - documents and enrichment payloads
//! - [`PaginatedResult`] - the envelope every operation returns
//!
//! # Example
//!
//! ```
//! use helios_evidence::types::{RawSearchParams, SearchParams, DataStructure};
//!
//! let raw = RawSearchParams {
//!     size: Some("5000".to_string()),
//!     datastructure: Some("simple".to_string()),
//!     ..Default::default()
//! };
//! let params = SearchParams::from_raw(&raw);
//!
//! assert_eq!(params.size(), 1000);
//! assert_eq!(params.data_structure(), DataStructure::Simple);
//! ```

mod evidence;
mod filter;
mod pagination;
mod search_params;

pub use evidence::{EfoInfo, Evidence, GeneInfo, clean_description};
pub use filter::{BooleanOperator, DimensionFilter, FilterDimension, FilterSet};
pub use pagination::{PaginatedResult, XML_ROOT};
pub use search_params::{
    DEFAULT_PAGE_SIZE, DataStructure, GroupBy, MAX_PAGE_SIZE, OutputFormat, RawSearchParams,
    SearchParams,
};
