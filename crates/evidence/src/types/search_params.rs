//! Request options and their normalization.
//!
//! [`RawSearchParams`] is what the resource layer deserializes from a query
//! string. [`SearchParams::from_raw`] turns it into the immutable options
//! value every operation takes:
//!
//! - missing or falsy `size`/`from` (absent, `0`, empty) fall back to defaults
//! - `size` saturates at [`MAX_PAGE_SIZE`]
//! - a `groupby` outside the allow-list is dropped
//! - `format`/`datastructure` are kept verbatim and resolved on use

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::SourceFilter;
use crate::schema;

/// Page size used when the request does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a request can ask for.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Grouping requested for aggregated views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// Group by gene.
    #[serde(rename = "gene")]
    Gene,
    /// Group by evidence type.
    #[serde(rename = "evidence-type")]
    EvidenceType,
    /// Group by EFO term.
    #[serde(rename = "efo")]
    Efo,
}

impl GroupBy {
    /// Parses an allow-listed grouping; anything else yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gene" => Some(GroupBy::Gene),
            "evidence-type" => Some(GroupBy::EvidenceType),
            "efo" => Some(GroupBy::Efo),
            _ => None,
        }
    }
}

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default).
    #[default]
    Json,
    /// XML derived from the structured shape.
    Xml,
    /// Tabular CSV text.
    Csv,
}

impl OutputFormat {
    /// Resolves a raw format name, defaulting to JSON for unknown values.
    pub fn resolve(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Xml => "application/xml",
            OutputFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// How much of each record a result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStructure {
    /// Whole documents, enriched with gene/EFO metadata.
    #[default]
    Full,
    /// Identifier fields only.
    Simple,
    /// Totals only, no records.
    Count,
}

impl DataStructure {
    /// Resolves a raw data-structure name, defaulting to `Full`.
    pub fn resolve(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Returns the `_source` filter matching this data structure.
    pub fn source_filter(&self) -> SourceFilter {
        match self {
            DataStructure::Full => SourceFilter::All,
            DataStructure::Simple => SourceFilter::fields(schema::evidence::SIMPLE_SOURCE),
            DataStructure::Count => SourceFilter::None,
        }
    }
}

impl FromStr for DataStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(DataStructure::Full),
            "simple" => Ok(DataStructure::Simple),
            "count" => Ok(DataStructure::Count),
            other => Err(format!("unknown data structure: {}", other)),
        }
    }
}

impl fmt::Display for DataStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataStructure::Full => write!(f, "full"),
            DataStructure::Simple => write!(f, "simple"),
            DataStructure::Count => write!(f, "count"),
        }
    }
}

/// Request options exactly as received.
///
/// Numeric fields accept JSON numbers or strings so the same struct works for
/// query strings and JSON bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchParams {
    /// Requested page size.
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,

    /// Requested offset.
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: Option<String>,

    /// Requested grouping.
    #[serde(default, alias = "groupBy")]
    pub groupby: Option<String>,

    /// Requested ordering, passed through.
    #[serde(default, alias = "orderBy")]
    pub orderby: Option<String>,

    /// Lower range bound, passed through.
    #[serde(default, deserialize_with = "lenient_string")]
    pub gte: Option<String>,

    /// Upper range bound, passed through.
    #[serde(default, deserialize_with = "lenient_string")]
    pub lt: Option<String>,

    /// Requested output format.
    #[serde(default)]
    pub format: Option<String>,

    /// Requested data structure.
    #[serde(default, alias = "dataStructure")]
    pub datastructure: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Normalized, immutable request options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    size: u32,
    start_from: u32,
    group_by: Option<GroupBy>,
    order_by: Option<String>,
    gte: Option<String>,
    lt: Option<String>,
    format: String,
    data_structure: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from_raw(&RawSearchParams::default())
    }
}

impl From<RawSearchParams> for SearchParams {
    fn from(raw: RawSearchParams) -> Self {
        Self::from_raw(&raw)
    }
}

impl SearchParams {
    /// Normalizes raw request options. Never fails.
    pub fn from_raw(raw: &RawSearchParams) -> Self {
        Self {
            size: normalize_size(parse_int(raw.size.as_deref())),
            start_from: normalize_offset(parse_int(raw.from.as_deref())),
            group_by: raw.groupby.as_deref().and_then(GroupBy::parse),
            order_by: non_empty(raw.orderby.as_deref()),
            gte: non_empty(raw.gte.as_deref()),
            lt: non_empty(raw.lt.as_deref()),
            format: non_empty(raw.format.as_deref()).unwrap_or_else(|| "json".to_string()),
            data_structure: non_empty(raw.datastructure.as_deref())
                .unwrap_or_else(|| "full".to_string()),
        }
    }

    /// Returns a copy with a different page size, normalized the same way.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = normalize_size(Some(size));
        self
    }

    /// Returns a copy with a different offset.
    pub fn with_from(mut self, from: i64) -> Self {
        self.start_from = normalize_offset(Some(from));
        self
    }

    /// Returns a copy with a different output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format.to_string();
        self
    }

    /// Returns a copy with a different data structure.
    pub fn with_data_structure(mut self, data_structure: DataStructure) -> Self {
        self.data_structure = data_structure.to_string();
        self
    }

    /// Page size, in `[0, MAX_PAGE_SIZE]`.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Offset of the first returned record.
    pub fn start_from(&self) -> u32 {
        self.start_from
    }

    /// Allow-listed grouping, if any.
    pub fn group_by(&self) -> Option<GroupBy> {
        self.group_by
    }

    /// Ordering hint, passed through untouched.
    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    /// Lower range bound, passed through untouched.
    pub fn gte(&self) -> Option<&str> {
        self.gte.as_deref()
    }

    /// Upper range bound, passed through untouched.
    pub fn lt(&self) -> Option<&str> {
        self.lt.as_deref()
    }

    /// The format name as requested.
    pub fn raw_format(&self) -> &str {
        &self.format
    }

    /// The data-structure name as requested.
    pub fn raw_data_structure(&self) -> &str {
        &self.data_structure
    }

    /// Resolved output format.
    pub fn format(&self) -> OutputFormat {
        OutputFormat::resolve(&self.format)
    }

    /// Resolved data structure.
    pub fn data_structure(&self) -> DataStructure {
        DataStructure::resolve(&self.data_structure)
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}

fn normalize_size(size: Option<i64>) -> u32 {
    match size {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(s) => s.clamp(0, MAX_PAGE_SIZE as i64) as u32,
    }
}

fn normalize_offset(from: Option<i64>) -> u32 {
    from.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_size(size: &str) -> RawSearchParams {
        RawSearchParams {
            size: Some(size.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let params = SearchParams::default();
        assert_eq!(params.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.start_from(), 0);
        assert_eq!(params.group_by(), None);
        assert_eq!(params.format(), OutputFormat::Json);
        assert_eq!(params.data_structure(), DataStructure::Full);
    }

    #[test]
    fn test_falsy_size_uses_default() {
        assert_eq!(SearchParams::from_raw(&raw_size("0")).size(), 10);
        assert_eq!(SearchParams::from_raw(&raw_size("")).size(), 10);
        assert_eq!(SearchParams::from_raw(&RawSearchParams::default()).size(), 10);
    }

    #[test]
    fn test_size_clamped() {
        assert_eq!(SearchParams::from_raw(&raw_size("25")).size(), 25);
        assert_eq!(SearchParams::from_raw(&raw_size("1000")).size(), 1000);
        assert_eq!(SearchParams::from_raw(&raw_size("5000")).size(), 1000);
        assert_eq!(SearchParams::from_raw(&raw_size("-3")).size(), 0);
    }

    #[test]
    fn test_size_clamp_property() {
        for s in [-50_i64, -1, 0, 1, 9, 10, 11, 999, 1000, 1001, 10_000] {
            let expected = if s == 0 { 10 } else { s.clamp(0, 1000) as u32 };
            assert_eq!(SearchParams::default().with_size(s).size(), expected, "size {}", s);
        }
    }

    #[test]
    fn test_falsy_from_uses_zero() {
        let raw = RawSearchParams {
            from: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(SearchParams::from_raw(&raw).start_from(), 0);

        let raw = RawSearchParams {
            from: Some("40".to_string()),
            ..Default::default()
        };
        assert_eq!(SearchParams::from_raw(&raw).start_from(), 40);
    }

    #[test]
    fn test_groupby_allow_list() {
        let raw = RawSearchParams {
            groupby: Some("evidence-type".to_string()),
            ..Default::default()
        };
        assert_eq!(
            SearchParams::from_raw(&raw).group_by(),
            Some(GroupBy::EvidenceType)
        );

        let raw = RawSearchParams {
            groupby: Some("tissue".to_string()),
            ..Default::default()
        };
        assert_eq!(SearchParams::from_raw(&raw).group_by(), None);
    }

    #[test]
    fn test_format_passthrough_and_resolution() {
        let raw = RawSearchParams {
            format: Some("yaml".to_string()),
            datastructure: Some("COUNT".to_string()),
            ..Default::default()
        };
        let params = SearchParams::from_raw(&raw);
        assert_eq!(params.raw_format(), "yaml");
        assert_eq!(params.format(), OutputFormat::Json);
        assert_eq!(params.data_structure(), DataStructure::Count);
    }

    #[test]
    fn test_deserialize_from_json_numbers_and_strings() {
        let raw: RawSearchParams =
            serde_json::from_str(r#"{"size": 20, "from": "5", "dataStructure": "simple"}"#)
                .unwrap();
        let params = SearchParams::from_raw(&raw);
        assert_eq!(params.size(), 20);
        assert_eq!(params.start_from(), 5);
        assert_eq!(params.data_structure(), DataStructure::Simple);
    }

    #[test]
    fn test_source_filter_per_data_structure() {
        assert_eq!(DataStructure::Full.source_filter(), SourceFilter::All);
        assert_eq!(DataStructure::Count.source_filter(), SourceFilter::None);
        match DataStructure::Simple.source_filter() {
            SourceFilter::Fields(fields) => {
                assert!(fields.contains(&"biological_subject.about".to_string()))
            }
            other => panic!("unexpected filter: {:?}", other),
        }
    }
}
