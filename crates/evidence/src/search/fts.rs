//! Free-text search over gene and EFO documents.
//!
//! The phrase is lower-cased and, unless the caller already wrote a
//! wildcard, a `*` is appended to every word but the last. The query is a
//! disjunction of fuzzy clauses, one per searchable field, with boosts that
//! rank identifier and symbol matches above description matches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::DocumentFamily;
use crate::core::SearchHit;
use crate::schema::{efo, gene};
use crate::types::clean_description;

/// Which document families a free-text search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreeTextScope {
    /// Genes and EFO terms.
    #[default]
    All,
    /// Genes only.
    Gene,
    /// EFO terms only.
    Efo,
}

impl FreeTextScope {
    /// Resolves a scope name; unknown names mean `All`.
    pub fn resolve(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Families searched under this scope.
    pub fn families(&self) -> Vec<DocumentFamily> {
        match self {
            FreeTextScope::All => vec![DocumentFamily::Efo, DocumentFamily::Gene],
            FreeTextScope::Gene => vec![DocumentFamily::Gene],
            FreeTextScope::Efo => vec![DocumentFamily::Efo],
        }
    }
}

impl FromStr for FreeTextScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FreeTextScope::All),
            "gene" => Ok(FreeTextScope::Gene),
            "efo" => Ok(FreeTextScope::Efo),
            other => Err(format!("unknown free-text scope: {}", other)),
        }
    }
}

impl fmt::Display for FreeTextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeTextScope::All => write!(f, "all"),
            FreeTextScope::Gene => write!(f, "gene"),
            FreeTextScope::Efo => write!(f, "efo"),
        }
    }
}

/// Tuning of one fuzzy clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyField {
    /// Field name.
    pub field: &'static str,
    /// Score multiplier.
    pub boost: f64,
    /// Leading characters that must match exactly.
    pub prefix_length: u32,
    /// Cap on generated term variants.
    pub max_expansions: Option<u32>,
    /// Fixed edit distance; `None` leaves the backend default.
    pub fuzziness: Option<u32>,
}

/// Searchable fields, strongest first within each family.
pub const FUZZY_FIELDS: &[FuzzyField] = &[
    FuzzyField {
        field: efo::LABEL,
        boost: 2.0,
        prefix_length: 1,
        max_expansions: Some(100),
        fuzziness: None,
    },
    FuzzyField {
        field: efo::PATH,
        boost: 1.0,
        prefix_length: 1,
        max_expansions: Some(100),
        fuzziness: None,
    },
    FuzzyField {
        field: gene::ENSEMBL_ID,
        boost: 3.0,
        prefix_length: 1,
        max_expansions: None,
        fuzziness: Some(0),
    },
    FuzzyField {
        field: gene::SYMBOL,
        boost: 2.0,
        prefix_length: 0,
        max_expansions: Some(50),
        fuzziness: None,
    },
    FuzzyField {
        field: gene::DESCRIPTION,
        boost: 1.0,
        prefix_length: 2,
        max_expansions: Some(50),
        fuzziness: None,
    },
];

impl FuzzyField {
    fn clause(&self, phrase: &str) -> Value {
        let mut params = json!({
            "value": phrase,
            "boost": self.boost,
            "prefix_length": self.prefix_length,
        });
        if let Some(max) = self.max_expansions {
            params["max_expansions"] = json!(max);
        }
        if let Some(fuzziness) = self.fuzziness {
            params["fuzziness"] = json!(fuzziness);
        }
        json!({ "fuzzy": { self.field: params } })
    }
}

/// Normalizes a phrase before dispatch.
///
/// A phrase containing `*` is taken as a deliberate pattern and returned as
/// is. Otherwise it is lower-cased and a wildcard is inserted after every
/// word but the last.
pub fn prepare_phrase(phrase: &str) -> String {
    if phrase.contains('*') {
        return phrase.to_string();
    }
    phrase
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("* ")
}

/// Builds the fuzzy disjunction for an already prepared phrase.
pub fn build_query(prepared: &str) -> Value {
    let clauses: Vec<Value> = FUZZY_FIELDS.iter().map(|f| f.clause(prepared)).collect();
    json!({
        "bool": {
            "should": clauses,
            "minimum_should_match": 1
        }
    })
}

/// Turns a free-text hit into a result datapoint.
///
/// The datapoint carries the hit's family, source, id and score, plus a
/// title and description resolved per family. Hits from an unknown index
/// keep `title`/`description` empty.
pub fn datapoint(hit: SearchHit) -> Value {
    let (title, description) = match hit.family {
        Some(DocumentFamily::Gene) => (
            hit.str_value(gene::SYMBOL).map(str::to_string),
            hit.str_value(gene::DESCRIPTION).map(clean_description),
        ),
        Some(DocumentFamily::Efo) => (
            hit.str_value(efo::LABEL).map(str::to_string),
            hit.str_value(efo::CODE).map(str::to_string),
        ),
        _ => (None, None),
    };
    let kind = hit
        .family
        .map(|f| f.as_str().to_string())
        .unwrap_or_else(|| hit.index.clone());

    json!({
        "type": kind,
        "data": hit.source,
        "id": hit.id,
        "score": hit.score,
        "title": title,
        "description": description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_inserts_wildcards_between_words() {
        assert_eq!(prepare_phrase("Breast Cancer"), "breast* cancer");
        assert_eq!(prepare_phrase("  BRCA1  "), "brca1");
        assert_eq!(prepare_phrase("a b c"), "a* b* c");
    }

    #[test]
    fn test_prepare_keeps_explicit_wildcards() {
        assert_eq!(prepare_phrase("BRCA*"), "BRCA*");
        assert_eq!(prepare_phrase("breast *"), "breast *");
    }

    #[test]
    fn test_query_boosts() {
        let query = build_query("brca1");
        let should = query["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 5);

        let ensembl = &should[2]["fuzzy"]["Ensembl Gene ID"];
        assert_eq!(ensembl["boost"], 3.0);
        assert_eq!(ensembl["fuzziness"], 0);
        assert!(ensembl.get("max_expansions").is_none());

        let description = &should[4]["fuzzy"]["Description"];
        assert_eq!(description["prefix_length"], 2);
        assert_eq!(description["value"], "brca1");
    }

    #[test]
    fn test_scope_families() {
        assert_eq!(FreeTextScope::resolve("GENE"), FreeTextScope::Gene);
        assert_eq!(FreeTextScope::resolve("bogus"), FreeTextScope::All);
        assert_eq!(
            FreeTextScope::All.families(),
            vec![DocumentFamily::Efo, DocumentFamily::Gene]
        );
    }

    #[test]
    fn test_gene_datapoint() {
        let hit = SearchHit::new(
            DocumentFamily::Gene,
            "ENSG00000012048",
            json!({
                "Associated Gene Name": "BRCA1",
                "Description": "breast cancer 1 [Source:HGNC]"
            }),
        )
        .with_score(4.5);
        let point = datapoint(hit);
        assert_eq!(point["type"], "gene");
        assert_eq!(point["title"], "BRCA1");
        assert_eq!(point["description"], "breast cancer 1");
        assert_eq!(point["score"], 4.5);
        assert_eq!(point["id"], "ENSG00000012048");
    }

    #[test]
    fn test_efo_datapoint() {
        let hit = SearchHit::new(
            DocumentFamily::Efo,
            "EFO_0000270",
            json!({"label": "asthma", "efoid": "EFO_0000270"}),
        );
        let point = datapoint(hit);
        assert_eq!(point["type"], "efo");
        assert_eq!(point["title"], "asthma");
        assert_eq!(point["description"], "EFO_0000270");
        assert!(point["score"].is_null());
    }
}
