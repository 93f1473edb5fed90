//! Backend traits and the request/response values that cross them.
//!
//! - [`SearchBackend`] - bounded queries and scroll cursors
//! - [`SearchRequest`] / [`ScanRequest`] - what the engine asks for
//! - [`SearchResponse`] / [`ScrollPage`] - what comes back
//! - [`HitScanner`] - drains a scroll cursor batch by batch

mod backend;
mod scan;

pub use backend::{
    ScanRequest, ScrollPage, SearchBackend, SearchHit, SearchRequest, SearchResponse, SourceFilter,
};
pub use scan::HitScanner;
