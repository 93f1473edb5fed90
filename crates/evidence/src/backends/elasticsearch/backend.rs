//! Elasticsearch backend configuration and client construction.

use std::fmt::Debug;
use std::time::Duration;

use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use serde::{Deserialize, Serialize};

use crate::config::{DocumentFamily, IndexConfig};
use crate::error::{BackendError, EvidenceResult};

/// Name reported by this backend in logs and errors.
pub(crate) const BACKEND_NAME: &str = "elasticsearch";

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the Elasticsearch backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs (e.g., `["http://localhost:9200"]`).
    /// Only the first node is used (single-node connection pool).
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,

    /// Index names for every document family.
    #[serde(default)]
    pub indices: IndexConfig,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_nodes() -> Vec<String> {
    vec!["http://localhost:9200".to_string()]
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            indices: IndexConfig::default(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

/// Elasticsearch implementation of [`SearchBackend`](crate::core::SearchBackend).
pub struct ElasticsearchBackend {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchBackend {
    /// Creates a backend from configuration. No request is sent.
    pub fn new(config: ElasticsearchConfig) -> EvidenceResult<Self> {
        let client = Self::build_client(&config)?;
        tracing::info!(
            node = config.nodes.first().map(String::as_str).unwrap_or_default(),
            data_version = %config.indices.data_version,
            "Elasticsearch backend configured"
        );
        Ok(Self { client, config })
    }

    fn build_client(config: &ElasticsearchConfig) -> EvidenceResult<Elasticsearch> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| BackendError::ConnectionFailed {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Invalid URL '{}': {}", url, e),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| BackendError::ConnectionFailed {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the Elasticsearch client.
    pub(crate) fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Returns the index configuration.
    pub fn indices(&self) -> &IndexConfig {
        &self.config.indices
    }

    /// Returns the concrete index names for a set of families.
    pub fn index_names(&self, families: &[DocumentFamily]) -> Vec<String> {
        families
            .iter()
            .map(|family| self.config.indices.index(*family))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ElasticsearchConfig::default();
        assert_eq!(config.nodes, vec!["http://localhost:9200"]);
        assert_eq!(config.request_timeout_ms, 30000);
        assert_eq!(config.indices, IndexConfig::default());
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: ElasticsearchConfig = serde_json::from_str(
            r#"{"nodes": ["http://es:9200"], "indices": {"data_version": "17.02_"}}"#,
        )
        .unwrap();
        assert_eq!(config.nodes, vec!["http://es:9200"]);
        assert_eq!(config.indices.data_version, "17.02_");
        assert_eq!(config.indices.evidence, "evidence-data*");
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_invalid_url_is_connection_failure() {
        let config = ElasticsearchConfig {
            nodes: vec!["not a url".to_string()],
            ..Default::default()
        };
        let err = ElasticsearchBackend::new(config).unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_index_names() {
        let backend = ElasticsearchBackend::new(ElasticsearchConfig::default()).unwrap();
        assert_eq!(
            backend.index_names(&[DocumentFamily::Efo, DocumentFamily::Gene]),
            vec!["16.08_efo-data", "16.08_gene-data"]
        );
    }
}
