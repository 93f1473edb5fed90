//! XML rendering of a structured result.
//!
//! The layout is the one existing API consumers parse: every value becomes
//! an element carrying a `type` attribute (`dict`, `list`, `str`, `int`,
//! `float`, `bool`, `null`), list elements are written as `<item>`, and map
//! keys become element names. Keys that are not valid element names are
//! written as `<key name="...">`.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use crate::error::{EvidenceError, EvidenceResult};

/// Renders `value` as an XML document whose root element is `root`.
pub fn to_xml(value: &Value, root: &str) -> EvidenceResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_document(&mut writer, value, root).map_err(xml_error)?;
    String::from_utf8(writer.into_inner()).map_err(|e| xml_error(e.to_string()))
}

fn write_document(writer: &mut Writer<Vec<u8>>, value: &Value, root: &str) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(root)))?;
    write_children(writer, value)?;
    writer.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(())
}

fn write_children(writer: &mut Writer<Vec<u8>>, value: &Value) -> io::Result<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_element(writer, key, child)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                write_element(writer, "item", item)?;
            }
            Ok(())
        }
        scalar => write_scalar(writer, scalar),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, key: &str, value: &Value) -> io::Result<()> {
    let (name, original) = match element_name(key) {
        Some(name) => (name, None),
        None => ("key".to_string(), Some(key)),
    };

    let mut start = BytesStart::new(name.as_str());
    if let Some(original) = original {
        start.push_attribute(("name", original));
    }
    start.push_attribute(("type", type_name(value)));

    if matches!(value, Value::Null) {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    write_children(writer, value)?;
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn write_scalar(writer: &mut Writer<Vec<u8>>, value: &Value) -> io::Result<()> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Ok(()),
    };
    writer.write_event(Event::Text(BytesText::new(&text)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "dict",
        Value::Array(_) => "list",
        Value::String(_) => "str",
        Value::Bool(_) => "bool",
        Value::Null => "null",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
    }
}

/// Turns a map key into an element name; spaces become underscores.
fn element_name(key: &str) -> Option<String> {
    let name = key.replace(' ', "_");
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return None;
    }
    if name.to_ascii_lowercase().starts_with("xml") {
        return None;
    }
    Some(name)
}

fn xml_error(err: impl ToString) -> EvidenceError {
    EvidenceError::unsupported_format("xml", err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    #[test]
    fn test_count_result() {
        let xml = to_xml(&json!({"total": 3, "took": 1}), "cttv-api-result").unwrap();
        assert_eq!(
            xml,
            format!(
                "{}<cttv-api-result><total type=\"int\">3</total>\
                 <took type=\"int\">1</took></cttv-api-result>",
                DECL
            )
        );
    }

    #[test]
    fn test_lists_and_nested_maps() {
        let xml = to_xml(
            &json!({"data": [{"label": "asthma", "score": 0.5}], "size": 1}),
            "root",
        )
        .unwrap();
        assert!(xml.contains(
            "<data type=\"list\"><item type=\"dict\"><label type=\"str\">asthma</label>\
             <score type=\"float\">0.5</score></item></data>"
        ));
        assert!(xml.contains("<size type=\"int\">1</size>"));
    }

    #[test]
    fn test_keys_with_spaces_and_invalid_names() {
        let xml = to_xml(
            &json!({"Associated Gene Name": "BRCA1", "1st": true, "gone": null}),
            "root",
        )
        .unwrap();
        assert!(xml.contains("<Associated_Gene_Name type=\"str\">BRCA1</Associated_Gene_Name>"));
        assert!(xml.contains("<key name=\"1st\" type=\"bool\">true</key>"));
        assert!(xml.contains("<gone type=\"null\"/>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = to_xml(&json!({"d": "a < b & c"}), "root").unwrap();
        assert!(xml.contains("a &lt; b &amp; c"));
    }
}
