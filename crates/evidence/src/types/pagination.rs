//! The paginated result envelope returned by every operation.

use serde_json::{Map, Value, json};

use super::{DataStructure, OutputFormat, SearchParams};
use crate::core::SearchResponse;
use crate::error::{EvidenceError, EvidenceResult};
use crate::output;

/// Root element name used for XML output.
pub const XML_ROOT: &str = "cttv-api-result";

/// A page of results plus its paging metadata.
///
/// For the `count` data structure no items are ever held; only the total and
/// the backend time survive. Otherwise the page size is always the number of
/// items.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult {
    total: u64,
    took_ms: u64,
    offset: u32,
    format: OutputFormat,
    data_structure: DataStructure,
    items: Option<Vec<Value>>,
}

impl PaginatedResult {
    /// Builds a result from a backend response, taking each hit's source as
    /// an item.
    pub fn new(response: SearchResponse, params: &SearchParams) -> Self {
        let data_structure = params.data_structure();
        let items = match data_structure {
            DataStructure::Count => None,
            _ => Some(response.hits.into_iter().map(|hit| hit.source).collect()),
        };
        Self {
            total: response.total,
            took_ms: response.took_ms,
            offset: params.start_from(),
            format: params.format(),
            data_structure,
            items,
        }
    }

    /// Builds a result from pre-shaped items.
    pub fn from_data(total: u64, took_ms: u64, data: Vec<Value>, params: &SearchParams) -> Self {
        Self {
            total,
            took_ms,
            offset: params.start_from(),
            format: params.format(),
            data_structure: params.data_structure(),
            items: None,
        }
        .with_data(data)
    }

    /// Replaces the items. Ignored for the `count` data structure.
    pub fn with_data(mut self, data: Vec<Value>) -> Self {
        if self.data_structure != DataStructure::Count {
            self.items = Some(data);
        }
        self
    }

    /// Total number of matching records.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Backend time in milliseconds.
    pub fn took_ms(&self) -> u64 {
        self.took_ms
    }

    /// Offset of the first item.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of items held.
    pub fn page_size(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    /// The items, absent for `count` results.
    pub fn items(&self) -> Option<&[Value]> {
        self.items.as_deref()
    }

    /// Consumes the result, returning its items.
    pub fn into_items(self) -> Option<Vec<Value>> {
        self.items
    }

    /// Format requested for rendering.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Data structure the result was built for.
    pub fn data_structure(&self) -> DataStructure {
        self.data_structure
    }

    /// The canonical structured shape.
    ///
    /// `{data, total, took, size, from}`, or `{total, took}` for `count`.
    pub fn to_structured(&self) -> Value {
        match self.items {
            None => json!({
                "total": self.total,
                "took": self.took_ms,
            }),
            Some(ref items) => {
                let mut map = Map::new();
                map.insert("data".to_string(), Value::Array(items.clone()));
                map.insert("total".to_string(), json!(self.total));
                map.insert("took".to_string(), json!(self.took_ms));
                map.insert("size".to_string(), json!(items.len()));
                map.insert("from".to_string(), json!(self.offset));
                Value::Object(map)
            }
        }
    }

    /// Renders the structured shape as JSON text.
    pub fn to_json(&self) -> EvidenceResult<String> {
        Ok(serde_json::to_string(&self.to_structured())?)
    }

    /// Renders the structured shape as XML.
    pub fn to_xml(&self) -> EvidenceResult<String> {
        output::xml::to_xml(&self.to_structured(), XML_ROOT)
    }

    /// Renders the items as CSV.
    pub fn to_csv(&self) -> EvidenceResult<String> {
        match self.items {
            None => Err(EvidenceError::unsupported_format(
                "csv",
                "count results carry no records",
            )),
            Some(ref items) => output::csv::to_csv(items),
        }
    }

    /// Renders in the requested format.
    pub fn render(&self) -> EvidenceResult<String> {
        self.render_as(self.format)
    }

    /// Renders in an explicit format.
    pub fn render_as(&self, format: OutputFormat) -> EvidenceResult<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Xml => self.to_xml(),
            OutputFormat::Csv => self.to_csv(),
        }
    }
}
