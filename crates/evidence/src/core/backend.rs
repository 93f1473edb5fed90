//! The search backend abstraction.
//!
//! The engine talks to the index only through [`SearchBackend`]. A backend
//! owns its [`IndexConfig`](crate::config::IndexConfig) and maps document
//! families to index names itself; callers address families, never indices.

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::config::DocumentFamily;
use crate::error::EvidenceResult;
use crate::types::SearchParams;

/// Which part of each document's `_source` to return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceFilter {
    /// The whole document.
    #[default]
    All,
    /// Only the listed fields.
    Fields(Vec<String>),
    /// No source at all.
    None,
}

impl SourceFilter {
    /// Builds a field-list filter.
    pub fn fields(fields: &[&str]) -> Self {
        SourceFilter::Fields(fields.iter().map(|f| f.to_string()).collect())
    }

    /// Renders the filter as the `_source` request value.
    pub fn to_json(&self) -> Value {
        match self {
            SourceFilter::All => json!(true),
            SourceFilter::Fields(fields) => json!(fields),
            SourceFilter::None => json!(false),
        }
    }
}

/// A bounded (size/from) query against one or more document families.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Families (indices) to search.
    pub families: Vec<DocumentFamily>,
    /// The `query` clause.
    pub query: Value,
    /// Maximum number of hits.
    pub size: u32,
    /// Offset of the first hit.
    pub from: u32,
    /// `_source` filtering.
    pub source: SourceFilter,
    /// Deadline hint passed to the backend (e.g. `"1m"`).
    pub timeout: Option<String>,
    /// Field whose value keeps only the top hit per distinct value.
    pub collapse: Option<String>,
}

impl SearchRequest {
    /// Creates a request for a single family with backend default paging.
    pub fn new(family: DocumentFamily, query: Value) -> Self {
        Self {
            families: vec![family],
            query,
            size: 10,
            from: 0,
            source: SourceFilter::All,
            timeout: None,
            collapse: None,
        }
    }

    /// Searches several families at once.
    pub fn with_families(mut self, families: Vec<DocumentFamily>) -> Self {
        self.families = families;
        self
    }

    /// Sets the page size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets the offset.
    pub fn with_from(mut self, from: u32) -> Self {
        self.from = from;
        self
    }

    /// Sets the source filter.
    pub fn with_source(mut self, source: SourceFilter) -> Self {
        self.source = source;
        self
    }

    /// Sets the deadline hint.
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Returns at most one hit per distinct value of `field`.
    pub fn with_collapse(mut self, field: impl Into<String>) -> Self {
        self.collapse = Some(field.into());
        self
    }

    /// Applies size, offset and source filtering from request options.
    pub fn paged(self, params: &SearchParams) -> Self {
        self.with_size(params.size())
            .with_from(params.start_from())
            .with_source(params.data_structure().source_filter())
    }

    /// Renders the complete request body.
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "query": self.query,
            "size": self.size,
            "from": self.from,
            "_source": self.source.to_json(),
            "track_total_hits": true,
        });
        if let Some(ref timeout) = self.timeout {
            body["timeout"] = json!(timeout);
        }
        if let Some(ref field) = self.collapse {
            body["collapse"] = json!({ "field": field });
        }
        body
    }

    /// Returns true if the request targets the given family.
    pub fn targets(&self, family: DocumentFamily) -> bool {
        self.families.contains(&family)
    }
}

/// A cursor-based bulk scan over one family.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    /// Family (index) to scan.
    pub family: DocumentFamily,
    /// The `query` clause.
    pub query: Value,
    /// `_source` filtering.
    pub source: SourceFilter,
    /// Hits fetched per round trip.
    pub batch_size: u32,
    /// How long the cursor stays alive between round trips (e.g. `"10m"`).
    pub keep_alive: String,
    /// Deadline hint for each round trip.
    pub timeout: Option<String>,
}

impl ScanRequest {
    /// Batch size used for full-corpus scans.
    pub const DEFAULT_BATCH_SIZE: u32 = 1000;

    /// Keep-alive window used for full-corpus scans.
    pub const DEFAULT_KEEP_ALIVE: &'static str = "10m";

    /// Creates a scan with the default batch size and keep-alive.
    pub fn new(family: DocumentFamily, query: Value) -> Self {
        Self {
            family,
            query,
            source: SourceFilter::All,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            keep_alive: Self::DEFAULT_KEEP_ALIVE.to_string(),
            timeout: None,
        }
    }

    /// Sets the source filter.
    pub fn with_source(mut self, source: SourceFilter) -> Self {
        self.source = source;
        self
    }

    /// Sets the deadline hint.
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Renders the body of the first scan request.
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "query": self.query,
            "size": self.batch_size,
            "_source": self.source.to_json(),
            "sort": ["_doc"],
        });
        if let Some(ref timeout) = self.timeout {
            body["timeout"] = json!(timeout);
        }
        body
    }
}

/// One hit returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Document id.
    pub id: String,
    /// Concrete index the hit came from.
    pub index: String,
    /// Family resolved from `index`; `None` if the index is not configured.
    pub family: Option<DocumentFamily>,
    /// Relevance score, absent for filter-only queries.
    pub score: Option<f64>,
    /// The `_source` document (`Value::Null` when source was disabled).
    pub source: Value,
    /// Requested stored fields.
    pub fields: Map<String, Value>,
}

impl SearchHit {
    /// Creates a hit from a document.
    pub fn new(family: DocumentFamily, id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            index: family.to_string(),
            family: Some(family),
            score: None,
            source,
            fields: Map::new(),
        }
    }

    /// Sets the relevance score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Looks up a top-level string in `_source`, falling back to `fields`.
    ///
    /// Stored fields are always arrays; the first element is returned.
    pub fn str_value(&self, name: &str) -> Option<&str> {
        if let Some(s) = self.source.get(name).and_then(first_str) {
            return Some(s);
        }
        self.fields.get(name).and_then(first_str)
    }
}

fn first_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

/// The outcome of a bounded query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    /// Hits in backend order.
    pub hits: Vec<SearchHit>,
    /// Total number of matching documents.
    pub total: u64,
    /// Time the backend spent, in milliseconds.
    pub took_ms: u64,
}

impl SearchResponse {
    /// Creates a response whose total equals the number of hits.
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            total: hits.len() as u64,
            hits,
            took_ms: 0,
        }
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// One round trip of a bulk scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollPage {
    /// Cursor to continue from, if the backend kept one open.
    pub scroll_id: Option<String>,
    /// Hits of this batch; empty once the scan is exhausted.
    pub hits: Vec<SearchHit>,
    /// Total number of documents the scan covers.
    pub total: u64,
}

/// A search index that can run bounded queries and bulk scans.
///
/// Implementations report every failure as an error; they never retry and
/// never turn a failure into an empty result.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Returns a short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Executes a bounded query.
    async fn search(&self, request: &SearchRequest) -> EvidenceResult<SearchResponse>;

    /// Opens a scroll cursor and returns its first batch.
    async fn open_scroll(&self, request: &ScanRequest) -> EvidenceResult<ScrollPage>;

    /// Fetches the next batch of an open cursor.
    async fn next_scroll(&self, scroll_id: &str, keep_alive: &str) -> EvidenceResult<ScrollPage>;

    /// Releases a cursor.
    async fn clear_scroll(&self, scroll_id: &str) -> EvidenceResult<()>;
}
