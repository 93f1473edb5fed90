//! Evidence documents and the metadata attached to them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DataStructure;
use crate::schema::{efo, evidence, gene};

/// An evidence document as stored in the index.
///
/// The document is kept as raw JSON so that fields the engine does not know
/// about survive a round trip. Enrichment only adds `gene_info` under the
/// subject and `efo_info` under the object; the reference fields are never
/// touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence(Value);

impl Evidence {
    /// Wraps a document.
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// The underlying document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwraps the document.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// First subject identifier, possibly URI-qualified.
    pub fn subject_about(&self) -> Option<&str> {
        first_about(self.0.get(evidence::SUBJECT)?)
    }

    /// First object identifier.
    pub fn object_about(&self) -> Option<&str> {
        first_about(self.0.get(evidence::OBJECT)?)
    }

    /// Evidence-type codes.
    pub fn evidence_codes(&self) -> Vec<&str> {
        match self
            .0
            .get("evidence")
            .and_then(|e| e.get("evidence_codes"))
        {
            Some(Value::Array(codes)) => codes.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(code)) => vec![code.as_str()],
            _ => Vec::new(),
        }
    }

    /// Attached gene metadata, if any.
    pub fn gene_info(&self) -> Option<&Value> {
        self.0.get(evidence::SUBJECT)?.get(evidence::GENE_INFO)
    }

    /// Attached EFO metadata, if any.
    pub fn efo_info(&self) -> Option<&Value> {
        self.0.get(evidence::OBJECT)?.get(evidence::EFO_INFO)
    }

    /// Sets `biological_subject.gene_info`, replacing any previous value.
    ///
    /// Returns false if the document has no subject object to attach to.
    pub fn attach_gene_info(&mut self, info: &GeneInfo) -> bool {
        attach(&mut self.0, evidence::SUBJECT, evidence::GENE_INFO, info)
    }

    /// Sets `biological_object.efo_info`, replacing any previous value.
    ///
    /// Returns false if the document has no object to attach to.
    pub fn attach_efo_info(&mut self, info: &EfoInfo) -> bool {
        attach(&mut self.0, evidence::OBJECT, evidence::EFO_INFO, info)
    }
}

impl From<Value> for Evidence {
    fn from(document: Value) -> Self {
        Self(document)
    }
}

impl From<Evidence> for Value {
    fn from(evidence: Evidence) -> Self {
        evidence.0
    }
}

fn first_about(reference: &Value) -> Option<&str> {
    match reference.get("about")? {
        Value::Array(items) => items.first().and_then(Value::as_str),
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn attach<T: Serialize>(document: &mut Value, parent: &str, key: &str, info: &T) -> bool {
    let Some(Value::Object(target)) = document.get_mut(parent) else {
        return false;
    };
    match serde_json::to_value(info) {
        Ok(value) => {
            target.insert(key.to_string(), value);
            true
        }
        Err(_) => false,
    }
}

/// Gene metadata keyed by Ensembl id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneInfo {
    /// Approved symbol.
    pub gene_name: String,
    /// Description without its bracketed source suffix (full shape only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_description: Option<String>,
    /// Canonical Ensembl id (full shape only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensembl_id: Option<String>,
}

impl GeneInfo {
    /// Builds the info for a gene-name document.
    ///
    /// Returns `None` for the `count` shape or when the document has no
    /// symbol.
    pub fn from_document(source: &Value, shape: DataStructure) -> Option<Self> {
        let gene_name = source.get(gene::SYMBOL)?.as_str()?.to_string();
        match shape {
            DataStructure::Full => Some(Self {
                gene_name,
                gene_description: source
                    .get(gene::DESCRIPTION)
                    .and_then(Value::as_str)
                    .map(clean_description),
                ensembl_id: source
                    .get(gene::ENSEMBL_ID)
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            DataStructure::Simple => Some(Self {
                gene_name,
                gene_description: None,
                ensembl_id: None,
            }),
            DataStructure::Count => None,
        }
    }
}

/// EFO term metadata keyed by EFO code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfoInfo {
    /// Term label.
    pub efo_label: String,
    /// Ontology path (full shape only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efo_path: Option<Value>,
}

impl EfoInfo {
    /// Builds the info for an EFO document.
    ///
    /// Returns `None` for the `count` shape or when the document has no
    /// label.
    pub fn from_document(source: &Value, shape: DataStructure) -> Option<Self> {
        let efo_label = source.get(efo::LABEL)?.as_str()?.to_string();
        match shape {
            DataStructure::Full => Some(Self {
                efo_label,
                efo_path: source.get(efo::PATH).cloned(),
            }),
            DataStructure::Simple => Some(Self {
                efo_label,
                efo_path: None,
            }),
            DataStructure::Count => None,
        }
    }
}

/// Cuts a gene description before its `[Source:...]` suffix.
pub fn clean_description(description: &str) -> String {
    description
        .split('[')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
