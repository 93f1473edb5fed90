//! Index configuration.
//!
//! Index names are never global: an [`IndexConfig`] is built once and handed
//! to the backend adapter and the query service at construction.
//!
//! Every index name is prefixed with the data version, so the default
//! configuration for release `16.08_` searches `16.08_evidence-data*`,
//! `16.08_gene-data` and so on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The document families stored in the index.
///
/// Each family lives in its own index; a hit's family is recovered from the
/// index it was served from (see [`IndexConfig::family_for_index`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFamily {
    /// Evidence strings linking a subject to an object.
    Evidence,
    /// UniProt ↔ Ensembl identifier mapping.
    Mapping,
    /// EFO disease/phenotype terms.
    Efo,
    /// ECO evidence-code terms.
    Eco,
    /// Gene name and description records.
    Gene,
}

impl DocumentFamily {
    /// Returns the family's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFamily::Evidence => "evidence",
            DocumentFamily::Mapping => "mapping",
            DocumentFamily::Efo => "efo",
            DocumentFamily::Eco => "eco",
            DocumentFamily::Gene => "gene",
        }
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the indices the engine reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Data release prefix prepended to every index (default: `"16.08_"`).
    #[serde(default = "default_data_version")]
    pub data_version: String,

    /// Evidence index, may be a pattern (default: `"evidence-data*"`).
    #[serde(default = "default_evidence_index")]
    pub evidence: String,

    /// Identifier mapping index (default: `"mapping"`).
    #[serde(default = "default_mapping_index")]
    pub mapping: String,

    /// EFO label index (default: `"efo-data"`).
    #[serde(default = "default_efo_index")]
    pub efo: String,

    /// ECO label index (default: `"eco-data"`).
    #[serde(default = "default_eco_index")]
    pub eco: String,

    /// Gene name index (default: `"gene-data"`).
    #[serde(default = "default_gene_index")]
    pub gene: String,
}

fn default_data_version() -> String {
    "16.08_".to_string()
}

fn default_evidence_index() -> String {
    "evidence-data*".to_string()
}

fn default_mapping_index() -> String {
    "mapping".to_string()
}

fn default_efo_index() -> String {
    "efo-data".to_string()
}

fn default_eco_index() -> String {
    "eco-data".to_string()
}

fn default_gene_index() -> String {
    "gene-data".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_version: default_data_version(),
            evidence: default_evidence_index(),
            mapping: default_mapping_index(),
            efo: default_efo_index(),
            eco: default_eco_index(),
            gene: default_gene_index(),
        }
    }
}

impl IndexConfig {
    /// Returns a copy of the default configuration for another data release.
    pub fn with_data_version(data_version: impl Into<String>) -> Self {
        Self {
            data_version: data_version.into(),
            ..Default::default()
        }
    }

    /// Returns the full (version-prefixed) index name for a family.
    pub fn index(&self, family: DocumentFamily) -> String {
        let base = match family {
            DocumentFamily::Evidence => &self.evidence,
            DocumentFamily::Mapping => &self.mapping,
            DocumentFamily::Efo => &self.efo,
            DocumentFamily::Eco => &self.eco,
            DocumentFamily::Gene => &self.gene,
        };
        format!("{}{}", self.data_version, base)
    }

    /// Resolves the family a concrete index name belongs to.
    ///
    /// A configured name ending in `*` matches any index sharing its prefix.
    pub fn family_for_index(&self, index: &str) -> Option<DocumentFamily> {
        const FAMILIES: [DocumentFamily; 5] = [
            DocumentFamily::Evidence,
            DocumentFamily::Mapping,
            DocumentFamily::Efo,
            DocumentFamily::Eco,
            DocumentFamily::Gene,
        ];

        FAMILIES.into_iter().find(|family| {
            let configured = self.index(*family);
            match configured.strip_suffix('*') {
                Some(prefix) => index.starts_with(prefix),
                None => index == configured,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_names() {
        let config = IndexConfig::default();
        assert_eq!(config.index(DocumentFamily::Evidence), "16.08_evidence-data*");
        assert_eq!(config.index(DocumentFamily::Gene), "16.08_gene-data");
        assert_eq!(config.index(DocumentFamily::Efo), "16.08_efo-data");
    }

    #[test]
    fn test_with_data_version() {
        let config = IndexConfig::with_data_version("17.02_");
        assert_eq!(config.index(DocumentFamily::Eco), "17.02_eco-data");
        assert_eq!(config.mapping, "mapping");
    }

    #[test]
    fn test_family_for_index() {
        let config = IndexConfig::default();
        assert_eq!(
            config.family_for_index("16.08_evidence-data-generic"),
            Some(DocumentFamily::Evidence)
        );
        assert_eq!(
            config.family_for_index("16.08_gene-data"),
            Some(DocumentFamily::Gene)
        );
        assert_eq!(config.family_for_index("16.08_gene-data-old"), None);
        assert_eq!(config.family_for_index("other"), None);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: IndexConfig = serde_json::from_str(r#"{"data_version": ""}"#).unwrap();
        assert_eq!(config.index(DocumentFamily::Efo), "efo-data");
        assert_eq!(config.evidence, "evidence-data*");
    }
}
