//! Request builders for every engine operation.
//!
//! Each function returns a complete [`SearchRequest`] or [`ScanRequest`]
//! addressed by document family; the backend maps families to indices.

use serde_json::{Value, json};

use super::alias::IdentifierNamespace;
use super::filter_composer;
use super::fts::{self, FreeTextScope};
use crate::config::DocumentFamily;
use crate::core::{ScanRequest, SearchRequest, SourceFilter};
use crate::schema::{efo, evidence, gene, mapping};
use crate::types::{FilterDimension, FilterSet, MAX_PAGE_SIZE, SearchParams};

/// Deadline hint for the heavier evidence queries.
pub const HEAVY_QUERY_TIMEOUT: &str = "1m";

/// Deadline hint for full-corpus scans.
pub const SCAN_TIMEOUT: &str = "10m";

/// Maximum number of codes returned for a label lookup.
pub const LABEL_LOOKUP_SIZE: u32 = 100;

/// Prefix disease codes carry in evidence documents.
pub const EFO_CODE_PREFIX: &str = "efo:";

fn filtered(filter: Value) -> Value {
    json!({ "constant_score": { "filter": filter } })
}

fn ids_query<S: AsRef<str>>(ids: &[S]) -> Value {
    let values: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
    json!({ "ids": { "values": values } })
}

fn batch_size(len: usize) -> u32 {
    (len as u64).min(MAX_PAGE_SIZE as u64) as u32
}

/// Prefixes a disease code with `efo:` unless it already has it.
pub fn normalize_efo_code(code: &str) -> String {
    if code.starts_with(EFO_CODE_PREFIX) {
        code.to_string()
    } else {
        format!("{}{}", EFO_CODE_PREFIX, code)
    }
}

/// Evidence whose subject is any alias of `gene`.
pub fn evidence_for_gene(gene: &str, params: &SearchParams) -> SearchRequest {
    let forms = super::alias::expand(FilterDimension::Gene, gene);
    SearchRequest::new(
        DocumentFamily::Evidence,
        filtered(json!({ "terms": { (evidence::SUBJECT_ABOUT): forms } })),
    )
    .paged(params)
}

/// Evidence whose subject is exactly the URI form of a canonical Ensembl id.
pub fn evidence_for_ensembl_id(ensembl_id: &str, params: &SearchParams) -> SearchRequest {
    let subject = IdentifierNamespace::Ensembl.qualify(ensembl_id);
    SearchRequest::new(
        DocumentFamily::Evidence,
        filtered(json!({ "term": { (evidence::SUBJECT_ABOUT): subject } })),
    )
    .paged(params)
}

/// Evidence for a disease code (normalized with [`normalize_efo_code`]).
pub fn evidence_for_disease(code: &str, params: &SearchParams) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Evidence,
        filtered(json!({ "term": { (evidence::OBJECT_ABOUT): normalize_efo_code(code) } })),
    )
    .paged(params)
    .with_timeout(HEAVY_QUERY_TIMEOUT)
}

/// Evidence linking an Ensembl gene to a disease code.
pub fn evidence_for_gene_and_disease(
    gene: &str,
    disease: &str,
    params: &SearchParams,
) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Evidence,
        json!({
            "bool": {
                "must": [
                    {
                        "match": {
                            (evidence::SUBJECT_ABOUT): IdentifierNamespace::Ensembl.compact(gene)
                        }
                    },
                    { "match": { (evidence::OBJECT_ABOUT): normalize_efo_code(disease) } }
                ]
            }
        }),
    )
    .paged(params)
    .with_timeout(HEAVY_QUERY_TIMEOUT)
}

/// Evidence documents by id.
///
/// The page always fits every requested id, up to the global cap.
pub fn evidence_by_ids(ids: &[String], params: &SearchParams) -> SearchRequest {
    let size = params.size().max(batch_size(ids.len()));
    SearchRequest::new(DocumentFamily::Evidence, ids_query(ids))
        .paged(params)
        .with_size(size)
}

/// Evidence matching a multi-dimension filter set.
pub fn filtered_evidence(filters: &FilterSet, params: &SearchParams) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Evidence,
        filter_composer::compose_query(filters),
    )
    .paged(params)
}

/// Fuzzy free-text search over genes and/or EFO terms.
///
/// Datapoints need whole documents, so the source is never filtered.
pub fn free_text(phrase: &str, scope: FreeTextScope, params: &SearchParams) -> SearchRequest {
    let prepared = fts::prepare_phrase(phrase);
    SearchRequest::new(DocumentFamily::Gene, fts::build_query(&prepared))
        .with_families(scope.families())
        .with_size(params.size())
        .with_from(params.start_from())
}

/// Scan over the subject of every evidence document.
pub fn available_genes_scan() -> ScanRequest {
    ScanRequest::new(DocumentFamily::Evidence, json!({ "match_all": {} }))
        .with_source(SourceFilter::fields(&[evidence::SUBJECT_ABOUT]))
        .with_timeout(SCAN_TIMEOUT)
}

/// First Ensembl id of genes whose symbol matches `name`.
pub fn ensembl_id_by_gene_name(name: &str) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Gene,
        json!({ "match": { (gene::SYMBOL): name } }),
    )
    .with_size(1)
    .with_source(SourceFilter::fields(&[gene::ENSEMBL_ID]))
}

/// Ensembl id mapped to a UniProt accession.
pub fn ensembl_id_from_uniprot(uniprot_id: &str) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Mapping,
        json!({ "match": { (mapping::UNIPROT): uniprot_id } }),
    )
    .with_size(1)
    .with_source(SourceFilter::fields(&[mapping::ENSEMBL]))
}

/// UniProt accession mapped to an Ensembl id.
pub fn uniprot_id_from_ensembl(ensembl_id: &str) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Mapping,
        json!({ "match": { (mapping::ENSEMBL): ensembl_id } }),
    )
    .with_size(1)
    .with_source(SourceFilter::fields(&[mapping::UNIPROT]))
}

/// One UniProt → Ensembl mapping per accession in a batch.
///
/// An accession can map to several genes; collapsing on the accession keeps
/// one hit per accession so the page always covers the whole batch.
pub fn ensembl_ids_from_uniprot_batch(uniprot_ids: &[String]) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Mapping,
        filtered(json!({ "terms": { (mapping::UNIPROT): uniprot_ids } })),
    )
    .with_collapse(mapping::UNIPROT)
    .with_size(batch_size(uniprot_ids.len()))
    .with_source(SourceFilter::fields(&[mapping::UNIPROT, mapping::ENSEMBL]))
}

/// Gene documents by Ensembl id.
pub fn gene_info(ensembl_ids: &[String]) -> SearchRequest {
    SearchRequest::new(DocumentFamily::Gene, ids_query(ensembl_ids))
        .with_size(batch_size(ensembl_ids.len()))
        .with_source(SourceFilter::fields(&[
            gene::SYMBOL,
            gene::DESCRIPTION,
            gene::ENSEMBL_ID,
        ]))
}

/// EFO documents by code.
pub fn efo_info(codes: &[String]) -> SearchRequest {
    SearchRequest::new(DocumentFamily::Efo, ids_query(codes))
        .with_size(batch_size(codes.len()))
        .with_source(SourceFilter::fields(&[efo::LABEL, efo::PATH]))
}

/// Label of an EFO code.
pub fn efo_label_from_code(code: &str) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Efo,
        json!({ "match": { (efo::CODE): format!("*{}", code) } }),
    )
    .with_size(1)
    .with_source(SourceFilter::fields(&[efo::LABEL]))
}

/// EFO codes whose label matches `label`.
pub fn efo_codes_from_label(label: &str) -> SearchRequest {
    SearchRequest::new(
        DocumentFamily::Efo,
        json!({ "match": { (efo::LABEL): label } }),
    )
    .with_size(LABEL_LOOKUP_SIZE)
    .with_source(SourceFilter::fields(&[efo::CODE]))
}

/// ECO document by code.
pub fn eco_by_code(code: &str) -> SearchRequest {
    SearchRequest::new(DocumentFamily::Eco, ids_query(&[code])).with_size(1)
}
