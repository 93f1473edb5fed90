//! Batch enrichment of evidence with gene and EFO metadata.
//!
//! Enrichment is a two-pass join over one page of evidence:
//!
//! 1. Derive each record's gene id. Subjects given as UniProt URIs are
//!    translated to Ensembl ids with a single batched mapping lookup; the
//!    translations form a memo table scoped to this call.
//! 2. Fetch gene metadata and EFO metadata for the distinct ids, one batched
//!    lookup each.
//!
//! The metadata is then attached in place. Records without a match are left
//! as they were; the number and order of records never change.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{SearchBackend, SearchHit};
use crate::error::EvidenceResult;
use crate::schema::mapping;
use crate::search::{alias, query_builder};
use crate::types::{DataStructure, EfoInfo, Evidence, GeneInfo};

/// Prefix of canonical Ensembl human gene ids.
const ENSEMBL_GENE_PREFIX: &str = "ENSG";

/// How a record's subject resolves to a gene id.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubjectId {
    /// Already usable as a gene-index key.
    Canonical(String),
    /// A UniProt accession that must be mapped first.
    Uniprot(String),
}

impl SubjectId {
    fn parse(about: &str) -> Self {
        let id = match about.rsplit_once('/') {
            Some((_, id)) => id,
            None => alias::strip_namespace(about),
        };
        if id.starts_with(ENSEMBL_GENE_PREFIX) {
            SubjectId::Canonical(id.to_string())
        } else {
            SubjectId::Uniprot(id.to_string())
        }
    }
}

/// Attaches `gene_info`/`efo_info` to evidence documents.
pub struct EnrichmentJoiner<'a, B: SearchBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: SearchBackend + ?Sized> EnrichmentJoiner<'a, B> {
    /// Creates a joiner over a backend.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Enriches a page of evidence documents.
    ///
    /// Only the `full` data structure is enriched; other shapes are returned
    /// unchanged without touching the backend.
    pub async fn enrich(
        &self,
        documents: Vec<Value>,
        data_structure: DataStructure,
    ) -> EvidenceResult<Vec<Value>> {
        if data_structure != DataStructure::Full || documents.is_empty() {
            return Ok(documents);
        }

        let mut records: Vec<Evidence> = documents.into_iter().map(Evidence::new).collect();

        // Pass 1: subject ids, translating UniProt accessions once each.
        let subjects: Vec<Option<SubjectId>> = records
            .iter()
            .map(|r| r.subject_about().map(SubjectId::parse))
            .collect();
        let accessions = distinct(subjects.iter().filter_map(|s| match s {
            Some(SubjectId::Uniprot(acc)) => Some(acc.as_str()),
            _ => None,
        }));
        let translated = self.ensembl_ids_for(&accessions).await?;

        let gene_ids: Vec<Option<String>> = subjects
            .into_iter()
            .map(|s| match s? {
                SubjectId::Canonical(id) => Some(id),
                SubjectId::Uniprot(acc) => translated.get(&acc).cloned(),
            })
            .collect();
        let efo_codes: Vec<Option<String>> = records
            .iter()
            .map(|r| r.object_about().map(str::to_string))
            .collect();

        // Pass 2: one lookup per metadata kind.
        let genes = self
            .gene_info(&distinct(gene_ids.iter().flatten().map(String::as_str)), data_structure)
            .await?;
        let efos = self
            .efo_info(&distinct(efo_codes.iter().flatten().map(String::as_str)), data_structure)
            .await?;

        let mut attached = (0usize, 0usize);
        for ((record, gene_id), efo_code) in records.iter_mut().zip(&gene_ids).zip(&efo_codes) {
            if let Some(info) = gene_id.as_ref().and_then(|id| genes.get(id)) {
                if record.attach_gene_info(info) {
                    attached.0 += 1;
                }
            }
            if let Some(info) = efo_code.as_ref().and_then(|code| efos.get(code)) {
                if record.attach_efo_info(info) {
                    attached.1 += 1;
                }
            }
        }
        debug!(
            records = records.len(),
            gene_info = attached.0,
            efo_info = attached.1,
            "Enriched evidence"
        );

        Ok(records.into_iter().map(Evidence::into_value).collect())
    }

    /// Maps UniProt accessions to Ensembl ids with one lookup.
    ///
    /// Accessions without a mapping are absent from the result. When an
    /// accession maps to several genes the first mapping wins.
    pub async fn ensembl_ids_for(
        &self,
        accessions: &[String],
    ) -> EvidenceResult<HashMap<String, String>> {
        let mut table = HashMap::new();
        if accessions.is_empty() {
            return Ok(table);
        }

        let request = query_builder::ensembl_ids_from_uniprot_batch(accessions);
        let response = self.backend.search(&request).await?;
        for hit in &response.hits {
            match (
                hit.str_value(mapping::UNIPROT),
                hit.str_value(mapping::ENSEMBL),
            ) {
                (Some(acc), Some(ensembl)) => {
                    table
                        .entry(acc.to_string())
                        .or_insert_with(|| ensembl.to_string());
                }
                _ => warn!(id = %hit.id, "Skipping mapping document without both ids"),
            }
        }
        debug!(
            requested = accessions.len(),
            resolved = table.len(),
            "Resolved UniProt accessions"
        );
        Ok(table)
    }

    /// Gene metadata for a set of Ensembl ids, keyed by id.
    pub async fn gene_info(
        &self,
        ensembl_ids: &[String],
        data_structure: DataStructure,
    ) -> EvidenceResult<HashMap<String, GeneInfo>> {
        self.lookup(ensembl_ids, query_builder::gene_info, |hit| {
            GeneInfo::from_document(&hit.source, data_structure)
        })
        .await
    }

    /// EFO metadata for a set of codes, keyed by code.
    pub async fn efo_info(
        &self,
        codes: &[String],
        data_structure: DataStructure,
    ) -> EvidenceResult<HashMap<String, EfoInfo>> {
        self.lookup(codes, query_builder::efo_info, |hit| {
            EfoInfo::from_document(&hit.source, data_structure)
        })
        .await
    }

    async fn lookup<T>(
        &self,
        ids: &[String],
        build: fn(&[String]) -> crate::core::SearchRequest,
        convert: impl Fn(&SearchHit) -> Option<T>,
    ) -> EvidenceResult<HashMap<String, T>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response = self.backend.search(&build(ids)).await?;
        Ok(response
            .hits
            .iter()
            .filter_map(|hit| convert(hit).map(|info| (hit.id.clone(), info)))
            .collect())
    }
}

/// Distinct values in first-seen order.
fn distinct<'s>(values: impl Iterator<Item = &'s str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
