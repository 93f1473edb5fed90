//! Field names of the documents stored in each index.

/// Evidence document fields.
pub mod evidence {
    /// Subject (gene/protein) reference.
    pub const SUBJECT: &str = "biological_subject";
    /// Subject identifier, possibly URI-qualified.
    pub const SUBJECT_ABOUT: &str = "biological_subject.about";
    /// Object (disease/phenotype) reference.
    pub const OBJECT: &str = "biological_object";
    /// Object identifier.
    pub const OBJECT_ABOUT: &str = "biological_object.about";
    /// Evidence-type codes.
    pub const EVIDENCE_CODES: &str = "evidence.evidence_codes";
    /// Side-payload attached to the subject by enrichment.
    pub const GENE_INFO: &str = "gene_info";
    /// Side-payload attached to the object by enrichment.
    pub const EFO_INFO: &str = "efo_info";

    /// Fields returned for the `simple` data structure.
    pub const SIMPLE_SOURCE: &[&str] = &[SUBJECT_ABOUT, OBJECT_ABOUT, EVIDENCE_CODES];
}

/// Gene name document fields.
pub mod gene {
    /// Canonical Ensembl gene identifier.
    pub const ENSEMBL_ID: &str = "Ensembl Gene ID";
    /// Approved gene symbol.
    pub const SYMBOL: &str = "Associated Gene Name";
    /// Free-text description, often with a bracketed source suffix.
    pub const DESCRIPTION: &str = "Description";
}

/// EFO term document fields.
pub mod efo {
    /// EFO code.
    pub const CODE: &str = "efoid";
    /// Human-readable label.
    pub const LABEL: &str = "label";
    /// Ontology path.
    pub const PATH: &str = "path";
}

/// Identifier mapping document fields.
pub mod mapping {
    /// UniProt accession.
    pub const UNIPROT: &str = "uniprot_accession";
    /// Ensembl gene identifier.
    pub const ENSEMBL: &str = "ensembl_gene_id";
}
