//! Rendering tests for the paginated result envelope.

mod common;

use serde_json::{Value, json};

use common::*;
use helios_evidence::core::SearchResponse;
use helios_evidence::types::{DataStructure, OutputFormat, PaginatedResult, SearchParams, XML_ROOT};

fn result(params: &SearchParams) -> PaginatedResult {
    let mut page = response(vec![
        evidence_hit("ev1", "ENSG1", "EFO_1"),
        evidence_hit("ev2", "ENSG2", "EFO_2"),
    ]);
    page.total = 57;
    PaginatedResult::new(page, params)
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_json_envelope() {
    let params = SearchParams::default().with_size(2).with_from(4);
    let rendered: Value = serde_json::from_str(&result(&params).to_json().unwrap()).unwrap();

    assert_eq!(rendered["total"], 57);
    assert_eq!(rendered["took"], 3);
    assert_eq!(rendered["size"], 2);
    assert_eq!(rendered["from"], 4);
    assert_eq!(rendered["data"][1]["id"], "ev2");
}

#[test]
fn test_json_field_order() {
    let text = result(&SearchParams::default()).to_json().unwrap();
    let positions: Vec<usize> = ["\"data\"", "\"total\"", "\"took\"", "\"size\"", "\"from\""]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_count_envelope() {
    let params = SearchParams::default().with_data_structure(DataStructure::Count);
    let structured = result(&params).to_structured();

    assert_eq!(structured, json!({"total": 57, "took": 3}));
}

// ============================================================================
// XML
// ============================================================================

#[test]
fn test_xml_root_and_types() {
    let params = SearchParams::default().with_format(OutputFormat::Xml);
    let xml = result(&params).render().unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(&format!("<{}>", XML_ROOT)));
    assert!(xml.ends_with(&format!("</{}>", XML_ROOT)));
    assert!(xml.contains("<data type=\"list\">"));
    assert!(xml.contains("<item type=\"dict\">"));
    assert!(xml.contains("<total type=\"int\">57</total>"));
}

#[test]
fn test_xml_count_result() {
    let params = SearchParams::default()
        .with_format(OutputFormat::Xml)
        .with_data_structure(DataStructure::Count);
    let xml = result(&params).render().unwrap();

    assert!(!xml.contains("<data"));
    assert!(xml.contains("<took type=\"int\">3</took>"));
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_csv_header_follows_first_item() {
    let params = SearchParams::default().with_format(OutputFormat::Csv);
    let data = vec![
        json!({"gene": "BRCA1", "disease": "EFO_0000305", "score": 0.9}),
        json!({"disease": "EFO_0000311", "gene": "TP53"}),
    ];
    let csv = PaginatedResult::from_data(2, 1, data, &params).render().unwrap();

    assert_eq!(csv, "gene,disease,score\nBRCA1,EFO_0000305,0.9\nTP53,EFO_0000311,\n");
}

#[test]
fn test_csv_nested_cells_are_json() {
    let params = SearchParams::default().with_format(OutputFormat::Csv);
    let csv = result(&params).render().unwrap();
    let mut lines = csv.lines();

    assert_eq!(
        lines.next(),
        Some("id,biological_subject,biological_object,evidence")
    );
    assert!(lines.next().unwrap().starts_with("ev1,\"{\"\"about\"\":[\"\"ENSG1\"\"]}\""));
}

#[test]
fn test_csv_count_is_unsupported() {
    let params = SearchParams::default()
        .with_format(OutputFormat::Csv)
        .with_data_structure(DataStructure::Count);
    let err = result(&params).render().unwrap_err();

    assert_eq!(err.status_code(), 406);
}

#[test]
fn test_csv_empty_page_is_unsupported() {
    let params = SearchParams::default().with_format(OutputFormat::Csv);
    let empty = PaginatedResult::new(SearchResponse::default(), &params);

    assert_eq!(empty.render().unwrap_err().status_code(), 406);
}
