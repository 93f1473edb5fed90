//! The evidence query service.
//!
//! [`EvidenceService`] is the single entry point for every read operation.
//! Callers pass already normalized [`SearchParams`]. Backend requests within
//! one call are awaited one after another, and `full` evidence pages are
//! enriched before being wrapped in a [`PaginatedResult`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::core::{HitScanner, SearchBackend, SearchRequest, SearchResponse};
use crate::enrichment::EnrichmentJoiner;
use crate::error::{EvidenceError, EvidenceResult};
use crate::schema::{efo, evidence, gene, mapping};
use crate::search::{FreeTextScope, alias, fts, query_builder};
use crate::types::{DataStructure, EfoInfo, FilterSet, GeneInfo, PaginatedResult, SearchParams};

/// Gene key under which evidence without a subject is counted.
pub const UNKNOWN_SUBJECT: &str = "unknown";

/// Controlled vocabularies with code → label lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vocabulary {
    /// Experimental Factor Ontology.
    Efo,
    /// Evidence & Conclusion Ontology.
    Eco,
}

impl FromStr for Vocabulary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "efo" => Ok(Vocabulary::Efo),
            "eco" => Ok(Vocabulary::Eco),
            other => Err(format!("unknown vocabulary: {}", other)),
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vocabulary::Efo => write!(f, "efo"),
            Vocabulary::Eco => write!(f, "eco"),
        }
    }
}

/// Read operations over the evidence index.
pub struct EvidenceService<B: SearchBackend> {
    backend: B,
}

impl<B: SearchBackend> EvidenceService<B> {
    /// Creates a service over a configured backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn run(&self, request: &SearchRequest) -> EvidenceResult<SearchResponse> {
        let response = self.backend.search(request).await?;
        debug!("Got {} hits in {}ms", response.total, response.took_ms);
        Ok(response)
    }

    /// Wraps an evidence response, enriching it for the `full` shape.
    async fn evidence_page(
        &self,
        response: SearchResponse,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let data_structure = params.data_structure();
        if data_structure != DataStructure::Full {
            return Ok(PaginatedResult::new(response, params));
        }
        let mut response = response;
        let documents = std::mem::take(&mut response.hits)
            .into_iter()
            .map(|hit| hit.source)
            .collect();
        let enriched = EnrichmentJoiner::new(&self.backend)
            .enrich(documents, data_structure)
            .await?;
        Ok(PaginatedResult::new(response, params).with_data(enriched))
    }

    /// Evidence for a gene given by any of its identifiers or by symbol.
    ///
    /// The subject is matched against every alias of `gene`. If nothing
    /// matches, `gene` is treated as a symbol: its Ensembl id is looked up by
    /// name and the query is retried on the qualified id.
    #[instrument(skip(self, params), fields(backend = self.backend.name()))]
    pub async fn evidence_for_gene(
        &self,
        gene: &str,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let mut response = self
            .run(&query_builder::evidence_for_gene(gene, params))
            .await?;

        if response.is_empty() {
            if let Some(ensembl_id) = self.ensembl_id_from_gene_name(gene).await? {
                debug!(gene, ensembl_id = %ensembl_id, "Retrying gene lookup by resolved name");
                response = self
                    .run(&query_builder::evidence_for_ensembl_id(&ensembl_id, params))
                    .await?;
            }
        }

        self.evidence_page(response, params).await
    }

    /// Evidence for a disease (EFO) code.
    #[instrument(skip(self, params), fields(backend = self.backend.name()))]
    pub async fn evidence_for_disease(
        &self,
        code: &str,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let response = self
            .run(&query_builder::evidence_for_disease(code, params))
            .await?;
        self.evidence_page(response, params).await
    }

    /// Evidence linking an Ensembl gene to a disease code.
    #[instrument(skip(self, params), fields(backend = self.backend.name()))]
    pub async fn evidence_for_gene_and_disease(
        &self,
        gene: &str,
        disease: &str,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let response = self
            .run(&query_builder::evidence_for_gene_and_disease(
                gene, disease, params,
            ))
            .await?;
        self.evidence_page(response, params).await
    }

    /// Evidence documents by id.
    ///
    /// Fails with `NotFound` when none of the ids exist.
    #[instrument(skip(self, ids, params), fields(backend = self.backend.name(), ids = ids.len()))]
    pub async fn evidence_by_ids(
        &self,
        ids: &[String],
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        if ids.is_empty() {
            return Err(EvidenceError::not_found("evidence", ""));
        }
        let response = self
            .run(&query_builder::evidence_by_ids(ids, params))
            .await?;
        if response.is_empty() {
            return Err(EvidenceError::not_found("evidence", ids.join(",")));
        }
        self.evidence_page(response, params).await
    }

    /// Evidence matching per-dimension filters, all combined with AND.
    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn evidences(
        &self,
        filters: &FilterSet,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let response = self
            .run(&query_builder::filtered_evidence(filters, params))
            .await?;
        self.evidence_page(response, params).await
    }

    /// Fuzzy search over gene and EFO documents.
    ///
    /// Items are datapoints `{type, data, id, score, title, description}`.
    #[instrument(skip(self, params), fields(backend = self.backend.name()))]
    pub async fn free_text_search(
        &self,
        phrase: &str,
        scope: FreeTextScope,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let mut response = self
            .run(&query_builder::free_text(phrase, scope, params))
            .await?;
        let hits = std::mem::take(&mut response.hits);
        let data = hits.into_iter().map(fts::datapoint).collect();
        Ok(PaginatedResult::new(response, params).with_data(data))
    }

    /// Number of evidence documents per gene, most evidence first.
    ///
    /// Scans the whole evidence index. Gene ids lose any known namespace
    /// prefix; ties are ordered by gene id. Evidence without a subject is
    /// counted under [`UNKNOWN_SUBJECT`], so the counts always add up to
    /// the number of scanned documents.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn available_gene_counts(&self) -> EvidenceResult<Vec<(String, u64)>> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut scanner = HitScanner::new(&self.backend, query_builder::available_genes_scan());

        while let Some(batch) = scanner.next_batch().await? {
            for hit in batch {
                let gene = match subject_of(&hit.source)
                    .or_else(|| hit.str_value(evidence::SUBJECT_ABOUT))
                {
                    Some(subject) => alias::strip_namespace(subject),
                    None => {
                        warn!(id = %hit.id, "Evidence without subject");
                        UNKNOWN_SUBJECT
                    }
                };
                *counts.entry(gene.to_string()).or_insert(0) += 1;
            }
        }

        let mut genes: Vec<(String, u64)> = counts.into_iter().collect();
        genes.sort_by(|a, b| match b.1.cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        info!(
            "Got a total of {} genes with {} evidences",
            genes.len(),
            genes.iter().map(|(_, n)| n).sum::<u64>()
        );
        Ok(genes)
    }

    /// [`available_gene_counts`](Self::available_gene_counts) as a result
    /// whose items are `[gene, count]` pairs.
    pub async fn available_genes(&self, params: &SearchParams) -> EvidenceResult<PaginatedResult> {
        let started = Instant::now();
        let genes = self.available_gene_counts().await?;
        let took_ms = started.elapsed().as_millis() as u64;
        let data = genes
            .into_iter()
            .map(|(gene, count)| json!([gene, count]))
            .collect::<Vec<_>>();
        Ok(PaginatedResult::from_data(
            data.len() as u64,
            took_ms,
            data,
            params,
        ))
    }

    /// Ensembl id of the first gene whose symbol matches `name`.
    pub async fn ensembl_id_from_gene_name(&self, name: &str) -> EvidenceResult<Option<String>> {
        let response = self
            .backend
            .search(&query_builder::ensembl_id_by_gene_name(name))
            .await?;
        debug!(
            "Got {} gene id hits in {}ms",
            response.total, response.took_ms
        );
        Ok(first_str(&response, gene::ENSEMBL_ID))
    }

    /// Ensembl id mapped to a UniProt accession.
    pub async fn ensembl_id_from_uniprot(
        &self,
        uniprot_id: &str,
    ) -> EvidenceResult<Option<String>> {
        let response = self
            .run(&query_builder::ensembl_id_from_uniprot(uniprot_id))
            .await?;
        Ok(first_str(&response, mapping::ENSEMBL))
    }

    /// UniProt accession mapped to an Ensembl id.
    pub async fn uniprot_id_from_ensembl(
        &self,
        ensembl_id: &str,
    ) -> EvidenceResult<Option<String>> {
        let response = self
            .run(&query_builder::uniprot_id_from_ensembl(ensembl_id))
            .await?;
        Ok(first_str(&response, mapping::UNIPROT))
    }

    /// Label of an EFO code.
    pub async fn efo_label_from_code(&self, code: &str) -> EvidenceResult<String> {
        let response = self
            .run(&query_builder::efo_label_from_code(code))
            .await?;
        first_str(&response, efo::LABEL).ok_or_else(|| EvidenceError::not_found("EFO code", code))
    }

    /// EFO codes whose label matches `label`.
    pub async fn efo_codes_from_label(&self, label: &str) -> EvidenceResult<Vec<String>> {
        let response = self
            .run(&query_builder::efo_codes_from_label(label))
            .await?;
        let codes: Vec<String> = response
            .hits
            .iter()
            .filter_map(|hit| hit.str_value(efo::CODE).map(str::to_string))
            .collect();
        if codes.is_empty() {
            return Err(EvidenceError::not_found("EFO label", label));
        }
        Ok(codes)
    }

    /// The ECO term document for a code.
    pub async fn eco_label_from_code(&self, code: &str) -> EvidenceResult<Value> {
        let response = self.run(&query_builder::eco_by_code(code)).await?;
        response
            .hits
            .into_iter()
            .next()
            .map(|hit| hit.source)
            .ok_or_else(|| EvidenceError::not_found("ECO code", code))
    }

    /// Label lookup for either vocabulary, as a one-item result.
    ///
    /// EFO items are `{code, label}`; ECO items are the term document.
    pub async fn label_for_code(
        &self,
        vocabulary: Vocabulary,
        code: &str,
        params: &SearchParams,
    ) -> EvidenceResult<PaginatedResult> {
        let started = Instant::now();
        let item = match vocabulary {
            Vocabulary::Efo => {
                let label = self.efo_label_from_code(code).await?;
                json!({ "code": code, "label": label })
            }
            Vocabulary::Eco => self.eco_label_from_code(code).await?,
        };
        let took_ms = started.elapsed().as_millis() as u64;
        Ok(PaginatedResult::from_data(1, took_ms, vec![item], params))
    }

    /// Gene metadata keyed by Ensembl id.
    pub async fn gene_info(
        &self,
        ensembl_ids: &[String],
        data_structure: DataStructure,
    ) -> EvidenceResult<HashMap<String, GeneInfo>> {
        EnrichmentJoiner::new(&self.backend)
            .gene_info(ensembl_ids, data_structure)
            .await
    }

    /// EFO metadata keyed by code.
    pub async fn efo_info(
        &self,
        codes: &[String],
        data_structure: DataStructure,
    ) -> EvidenceResult<HashMap<String, EfoInfo>> {
        EnrichmentJoiner::new(&self.backend)
            .efo_info(codes, data_structure)
            .await
    }
}

/// `biological_subject.about[0]` of a source document.
fn subject_of(source: &Value) -> Option<&str> {
    match source.get(evidence::SUBJECT)?.get("about")? {
        Value::Array(items) => items.first()?.as_str(),
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn first_str(response: &SearchResponse, field: &str) -> Option<String> {
    response
        .hits
        .iter()
        .find_map(|hit| hit.str_value(field))
        .map(str::to_string)
}
