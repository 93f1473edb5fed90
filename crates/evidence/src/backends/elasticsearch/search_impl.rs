//! [`SearchBackend`] implementation for Elasticsearch.

use async_trait::async_trait;
use elasticsearch::http::response::Response;
use elasticsearch::{ClearScrollParts, ScrollParts, SearchParts};
use serde_json::{Map, Value, json};

use crate::config::IndexConfig;
use crate::core::{ScanRequest, ScrollPage, SearchBackend, SearchHit, SearchRequest, SearchResponse};
use crate::error::{BackendError, EvidenceError, EvidenceResult};

use super::backend::{BACKEND_NAME, ElasticsearchBackend};

fn transport_error(err: elasticsearch::Error) -> EvidenceError {
    if err.is_timeout() {
        BackendError::Timeout {
            backend_name: BACKEND_NAME.to_string(),
            message: err.to_string(),
        }
        .into()
    } else {
        BackendError::Unavailable {
            backend_name: BACKEND_NAME.to_string(),
            message: err.to_string(),
        }
        .into()
    }
}

fn query_error(message: String) -> EvidenceError {
    BackendError::QueryError {
        backend_name: BACKEND_NAME.to_string(),
        message,
    }
    .into()
}

fn status_error(status: u16, body: String) -> EvidenceError {
    let backend_name = BACKEND_NAME.to_string();
    match status {
        408 | 504 => BackendError::Timeout {
            backend_name,
            message: body,
        }
        .into(),
        502 | 503 => BackendError::Unavailable {
            backend_name,
            message: body,
        }
        .into(),
        _ => query_error(format!("status {}: {}", status, body)),
    }
}

/// Checks the status and decodes the body of a response.
async fn read_body(response: Response) -> EvidenceResult<Value> {
    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status.as_u16(), body));
    }
    response.json::<Value>().await.map_err(|e| {
        BackendError::SerializationError {
            message: format!("Failed to parse search response: {}", e),
        }
        .into()
    })
}

/// Parses a search (or scroll) response body.
///
/// A response that reports `timed_out` is a timeout, never a partial result.
pub(crate) fn parse_search_response(
    body: &Value,
    indices: &IndexConfig,
) -> EvidenceResult<SearchResponse> {
    if body.get("timed_out").and_then(Value::as_bool) == Some(true) {
        return Err(BackendError::Timeout {
            backend_name: BACKEND_NAME.to_string(),
            message: "search timed out before completing".to_string(),
        }
        .into());
    }

    let hits_obj = body
        .get("hits")
        .ok_or_else(|| query_error("Search response has no hits".to_string()))?;

    let total = match hits_obj.get("total") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        None => 0,
    };

    let hits = hits_obj
        .get("hits")
        .and_then(Value::as_array)
        .map(|hits| hits.iter().filter_map(|hit| parse_hit(hit, indices)).collect())
        .unwrap_or_default();

    Ok(SearchResponse {
        hits,
        total,
        took_ms: body.get("took").and_then(Value::as_u64).unwrap_or(0),
    })
}

fn parse_hit(hit: &Value, indices: &IndexConfig) -> Option<SearchHit> {
    let Some(id) = hit.get("_id").and_then(Value::as_str) else {
        tracing::warn!("Skipping search hit without _id");
        return None;
    };
    let index = hit
        .get("_index")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(SearchHit {
        id: id.to_string(),
        family: indices.family_for_index(&index),
        index,
        score: hit.get("_score").and_then(Value::as_f64),
        source: hit.get("_source").cloned().unwrap_or(Value::Null),
        fields: hit
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new),
    })
}

fn parse_scroll_page(body: &Value, indices: &IndexConfig) -> EvidenceResult<ScrollPage> {
    let response = parse_search_response(body, indices)?;
    Ok(ScrollPage {
        scroll_id: body
            .get("_scroll_id")
            .and_then(Value::as_str)
            .map(str::to_string),
        hits: response.hits,
        total: response.total,
    })
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn search(&self, request: &SearchRequest) -> EvidenceResult<SearchResponse> {
        let indices = self.index_names(&request.families);
        let index_refs: Vec<&str> = indices.iter().map(String::as_str).collect();

        let response = self
            .client()
            .search(SearchParts::Index(&index_refs))
            .body(request.to_body())
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_body(response).await?;
        parse_search_response(&body, self.indices())
    }

    async fn open_scroll(&self, request: &ScanRequest) -> EvidenceResult<ScrollPage> {
        let index = self.indices().index(request.family);

        let response = self
            .client()
            .search(SearchParts::Index(&[&index]))
            .scroll(&request.keep_alive)
            .body(request.to_body())
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_body(response).await?;
        parse_scroll_page(&body, self.indices())
    }

    async fn next_scroll(&self, scroll_id: &str, keep_alive: &str) -> EvidenceResult<ScrollPage> {
        let response = self
            .client()
            .scroll(ScrollParts::None)
            .body(json!({
                "scroll": keep_alive,
                "scroll_id": scroll_id,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_body(response).await?;
        parse_scroll_page(&body, self.indices())
    }

    async fn clear_scroll(&self, scroll_id: &str) -> EvidenceResult<()> {
        let response = self
            .client()
            .clear_scroll(ClearScrollParts::None)
            .body(json!({ "scroll_id": [scroll_id] }))
            .send()
            .await
            .map_err(transport_error)?;

        // A cursor that already expired is gone either way.
        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentFamily;

    #[test]
    fn test_parse_search_response() {
        let body = json!({
            "took": 12,
            "timed_out": false,
            "hits": {
                "total": {"value": 57, "relation": "eq"},
                "hits": [
                    {
                        "_index": "16.08_gene-data",
                        "_id": "ENSG00000012048",
                        "_score": 3.2,
                        "_source": {"Associated Gene Name": "BRCA1"}
                    },
                    {
                        "_index": "16.08_efo-data",
                        "_id": "EFO_0000305",
                        "_score": null,
                        "_source": {"label": "breast carcinoma"}
                    }
                ]
            }
        });
        let response = parse_search_response(&body, &IndexConfig::default()).unwrap();
        assert_eq!(response.total, 57);
        assert_eq!(response.took_ms, 12);
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].family, Some(DocumentFamily::Gene));
        assert_eq!(response.hits[0].score, Some(3.2));
        assert_eq!(response.hits[1].family, Some(DocumentFamily::Efo));
        assert_eq!(response.hits[1].score, None);
    }

    #[test]
    fn test_parse_legacy_total_and_fields() {
        let body = json!({
            "took": 1,
            "hits": {
                "total": 3,
                "hits": [{
                    "_index": "16.08_evidence-data-generic",
                    "_id": "ev1",
                    "fields": {"biological_subject.about": ["ensembl:ENSG1"]}
                }]
            }
        });
        let response = parse_search_response(&body, &IndexConfig::default()).unwrap();
        assert_eq!(response.total, 3);
        let hit = &response.hits[0];
        assert_eq!(hit.family, Some(DocumentFamily::Evidence));
        assert!(hit.source.is_null());
        assert_eq!(hit.str_value("biological_subject.about"), Some("ensembl:ENSG1"));
    }

    #[test]
    fn test_timed_out_is_an_error() {
        let body = json!({"took": 60000, "timed_out": true, "hits": {"total": 0, "hits": []}});
        let err = parse_search_response(&body, &IndexConfig::default()).unwrap_err();
        assert_eq!(err.status_code(), 504);
    }

    #[test]
    fn test_missing_hits_is_an_error() {
        let err = parse_search_response(&json!({"took": 1}), &IndexConfig::default()).unwrap_err();
        assert!(err.is_backend());
    }

    #[test]
    fn test_scroll_page() {
        let body = json!({
            "_scroll_id": "c2Nyb2xs",
            "hits": {"total": {"value": 2}, "hits": [{"_id": "a", "_index": "x"}]}
        });
        let page = parse_scroll_page(&body, &IndexConfig::default()).unwrap();
        assert_eq!(page.scroll_id.as_deref(), Some("c2Nyb2xs"));
        assert_eq!(page.total, 2);
        assert_eq!(page.hits[0].family, None);
    }

    #[test]
    fn test_status_errors() {
        assert_eq!(status_error(503, String::new()).status_code(), 503);
        assert_eq!(status_error(504, String::new()).status_code(), 504);
        assert_eq!(
            status_error(404, "index_not_found_exception".to_string()).status_code(),
            500
        );
    }
}
