//! Test infrastructure for the evidence engine.
//!
//! [`MockBackend`] records every request it receives and answers from a
//! script: bounded queries pop scripted responses in order, scans pop
//! scripted pages in order. An unscripted query answers with no hits.
//! With [`MockBackend::paging`] on, scripted responses are collapsed and cut
//! to the request size the way the search engine would.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use helios_evidence::core::{
    ScanRequest, ScrollPage, SearchBackend, SearchHit, SearchRequest, SearchResponse,
};
use helios_evidence::{BackendError, DocumentFamily, EvidenceResult};

/// A recording, scripted [`SearchBackend`].
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<VecDeque<EvidenceResult<SearchResponse>>>,
    pages: Mutex<VecDeque<EvidenceResult<ScrollPage>>>,
    requests: Mutex<Vec<SearchRequest>>,
    scans: Mutex<Vec<ScanRequest>>,
    scroll_calls: Mutex<Vec<String>>,
    cleared: Mutex<Vec<String>>,
    paging: Mutex<bool>,
}

impl MockBackend {
    /// Creates a backend with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the response to the next bounded query.
    pub fn respond(&self, response: SearchResponse) -> &Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    /// Queues a failure for the next bounded query.
    pub fn fail(&self, error: BackendError) -> &Self {
        self.responses.lock().push_back(Err(error.into()));
        self
    }

    /// Queues the next scroll page.
    pub fn page(&self, scroll_id: Option<&str>, hits: Vec<SearchHit>, total: u64) -> &Self {
        self.pages.lock().push_back(Ok(ScrollPage {
            scroll_id: scroll_id.map(str::to_string),
            hits,
            total,
        }));
        self
    }

    /// Queues a failure for the next scroll round trip.
    pub fn fail_page(&self, error: BackendError) -> &Self {
        self.pages.lock().push_back(Err(error.into()));
        self
    }

    /// Applies each request's collapse field and size to scripted responses.
    pub fn paging(&self) -> &Self {
        *self.paging.lock() = true;
        self
    }

    /// Bounded queries received so far.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }

    /// Number of bounded queries received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Scans opened so far.
    pub fn scans(&self) -> Vec<ScanRequest> {
        self.scans.lock().clone()
    }

    /// Scroll ids continued so far.
    pub fn scroll_calls(&self) -> Vec<String> {
        self.scroll_calls.lock().clone()
    }

    /// Scroll ids released so far.
    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().clone()
    }

    fn next_page(&self) -> EvidenceResult<ScrollPage> {
        self.pages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ScrollPage::default()))
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> EvidenceResult<SearchResponse> {
        self.requests.lock().push(request.clone());
        let response = self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchResponse::default()))?;
        if *self.paging.lock() {
            Ok(window(request, response))
        } else {
            Ok(response)
        }
    }

    async fn open_scroll(&self, request: &ScanRequest) -> EvidenceResult<ScrollPage> {
        self.scans.lock().push(request.clone());
        self.next_page()
    }

    async fn next_scroll(&self, scroll_id: &str, _keep_alive: &str) -> EvidenceResult<ScrollPage> {
        self.scroll_calls.lock().push(scroll_id.to_string());
        self.next_page()
    }

    async fn clear_scroll(&self, scroll_id: &str) -> EvidenceResult<()> {
        self.cleared.lock().push(scroll_id.to_string());
        Ok(())
    }
}

/// Keeps the first hit per collapse value, then the first `size` hits.
fn window(request: &SearchRequest, mut response: SearchResponse) -> SearchResponse {
    if let Some(ref field) = request.collapse {
        let mut seen = HashSet::new();
        response.hits.retain(|hit| match hit.str_value(field) {
            Some(value) => seen.insert(value.to_string()),
            None => true,
        });
    }
    response.hits.truncate(request.size as usize);
    response
}

// ============================================================================
// Fixtures
// ============================================================================

/// A response whose total equals its hit count.
pub fn response(hits: Vec<SearchHit>) -> SearchResponse {
    SearchResponse {
        total: hits.len() as u64,
        hits,
        took_ms: 3,
    }
}

/// An evidence document.
pub fn evidence_doc(id: &str, subject: &str, object: &str) -> Value {
    json!({
        "id": id,
        "biological_subject": {"about": [subject]},
        "biological_object": {"about": [object]},
        "evidence": {"evidence_codes": ["ECO:0000205"]}
    })
}

/// An evidence hit.
pub fn evidence_hit(id: &str, subject: &str, object: &str) -> SearchHit {
    SearchHit::new(DocumentFamily::Evidence, id, evidence_doc(id, subject, object))
}

/// A gene-name hit keyed by Ensembl id.
pub fn gene_hit(ensembl_id: &str, symbol: &str, description: &str) -> SearchHit {
    SearchHit::new(
        DocumentFamily::Gene,
        ensembl_id,
        json!({
            "Ensembl Gene ID": ensembl_id,
            "Associated Gene Name": symbol,
            "Description": description
        }),
    )
}

/// An EFO hit keyed by code.
pub fn efo_hit(code: &str, label: &str) -> SearchHit {
    SearchHit::new(
        DocumentFamily::Efo,
        code,
        json!({"efoid": code, "label": label, "path": [["EFO_0000001", code]]}),
    )
}

/// A UniProt → Ensembl mapping hit.
pub fn mapping_hit(uniprot: &str, ensembl: &str) -> SearchHit {
    SearchHit::new(
        DocumentFamily::Mapping,
        format!("{}-{}", uniprot, ensembl),
        json!({"uniprot_accession": uniprot, "ensembl_gene_id": ensembl}),
    )
}

/// A scan hit carrying only the evidence subject.
pub fn subject_hit(id: &str, subject: &str) -> SearchHit {
    SearchHit::new(
        DocumentFamily::Evidence,
        id,
        json!({"biological_subject": {"about": [subject]}}),
    )
}
