//! Identifier alias expansion.
//!
//! Evidence documents reference genes, diseases and evidence codes either by
//! bare id or by an `identifiers.org` URI. A filter on one id has to match
//! every spelling of it.

use std::fmt;

use crate::types::FilterDimension;

/// Base of every URI-qualified identifier.
pub const IDENTIFIERS_ORG: &str = "http://identifiers.org/";

/// Identifier namespaces known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierNamespace {
    /// UniProt protein accessions.
    Uniprot,
    /// Ensembl gene ids.
    Ensembl,
    /// Experimental Factor Ontology terms.
    Efo,
    /// Evidence & Conclusion Ontology terms.
    Eco,
}

impl IdentifierNamespace {
    const ALL: [IdentifierNamespace; 4] = [
        IdentifierNamespace::Uniprot,
        IdentifierNamespace::Ensembl,
        IdentifierNamespace::Efo,
        IdentifierNamespace::Eco,
    ];

    /// Namespace name as used in URIs and compact prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierNamespace::Uniprot => "uniprot",
            IdentifierNamespace::Ensembl => "ensembl",
            IdentifierNamespace::Efo => "efo",
            IdentifierNamespace::Eco => "eco",
        }
    }

    /// URI prefix, e.g. `http://identifiers.org/ensembl/`.
    pub fn uri_prefix(&self) -> String {
        format!("{}{}/", IDENTIFIERS_ORG, self.as_str())
    }

    /// URI-qualifies a bare id.
    pub fn qualify(&self, id: &str) -> String {
        format!("{}{}", self.uri_prefix(), id)
    }

    /// Compact form, e.g. `ensembl:ENSG00000012048`.
    pub fn compact(&self, id: &str) -> String {
        format!("{}:{}", self.as_str(), id)
    }

    /// Namespaces whose URI forms a dimension's ids may take.
    pub fn for_dimension(dimension: FilterDimension) -> &'static [IdentifierNamespace] {
        match dimension {
            FilterDimension::Gene => &[IdentifierNamespace::Uniprot, IdentifierNamespace::Ensembl],
            FilterDimension::Object => &[IdentifierNamespace::Efo],
            FilterDimension::EvidenceType => &[IdentifierNamespace::Eco],
        }
    }
}

impl fmt::Display for IdentifierNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expands a raw id into its equivalent forms: the bare id first, then one
/// URI form per namespace of the dimension.
pub fn expand(dimension: FilterDimension, raw_id: &str) -> Vec<String> {
    let namespaces = IdentifierNamespace::for_dimension(dimension);
    let mut forms = Vec::with_capacity(namespaces.len() + 1);
    forms.push(raw_id.to_string());
    forms.extend(namespaces.iter().map(|ns| ns.qualify(raw_id)));
    forms
}

/// Strips a known namespace, in URI or compact form, from an id.
///
/// Ids without a known namespace are returned unchanged.
pub fn strip_namespace(id: &str) -> &str {
    for ns in IdentifierNamespace::ALL {
        if let Some(rest) = id
            .strip_prefix(IDENTIFIERS_ORG)
            .and_then(|r| r.strip_prefix(ns.as_str()))
            .and_then(|r| r.strip_prefix('/'))
        {
            return rest;
        }
        if let Some(rest) = id
            .strip_prefix(ns.as_str())
            .and_then(|r| r.strip_prefix(':'))
        {
            return rest;
        }
    }
    id
}
