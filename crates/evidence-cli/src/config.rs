//! Command-line configuration for the evidence CLI.
//!
//! Connection and logging options can be set on the command line or through
//! the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EVIDENCE_ES_URL` | http://localhost:9200 | Elasticsearch node URLs (comma-separated) |
//! | `EVIDENCE_ES_USERNAME` | | Basic auth username |
//! | `EVIDENCE_ES_PASSWORD` | | Basic auth password |
//! | `EVIDENCE_DATA_VERSION` | 16.08_ | Data release prefix of every index |
//! | `EVIDENCE_LOG_LEVEL` | info | Log level |
//! | `EVIDENCE_REQUEST_TIMEOUT_MS` | 30000 | Backend request timeout (milliseconds) |

use clap::{Args, Parser, Subcommand};
use helios_evidence::IndexConfig;
use helios_evidence::types::{DataStructure, OutputFormat, RawSearchParams, SearchParams};

#[cfg(feature = "elasticsearch")]
use helios_evidence::backends::elasticsearch::{ElasticsearchAuth, ElasticsearchConfig};

/// Top-level command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "evidence-cli")]
#[command(about = "Query gene-disease evidence from a search index")]
pub struct Cli {
    /// Connection, logging and output options.
    #[command(flatten)]
    pub config: CliConfig,

    /// The operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct CliConfig {
    /// Elasticsearch node URLs (comma-separated; only the first is used).
    #[arg(long, env = "EVIDENCE_ES_URL", default_value = "http://localhost:9200")]
    pub es_url: String,

    /// Basic auth username.
    #[arg(long, env = "EVIDENCE_ES_USERNAME")]
    pub es_username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "EVIDENCE_ES_PASSWORD", hide_env_values = true)]
    pub es_password: Option<String>,

    /// Data release prefix prepended to every index name.
    #[arg(long, env = "EVIDENCE_DATA_VERSION", default_value = "16.08_")]
    pub data_version: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "EVIDENCE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Backend request timeout in milliseconds.
    #[arg(long, env = "EVIDENCE_REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Page size.
    #[arg(long)]
    pub size: Option<String>,

    /// Offset of the first record.
    #[arg(long)]
    pub from: Option<String>,

    /// Output format (json, xml, csv).
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Data structure (full, simple, count).
    #[arg(long, default_value = "full")]
    pub data_structure: String,
}

/// Operations exposed by the CLI.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Evidence for a gene (any identifier or symbol).
    Gene {
        /// Gene identifier or symbol.
        gene: String,
    },

    /// Evidence for a disease (EFO) code.
    Disease {
        /// EFO code, with or without the `efo:` prefix.
        code: String,
    },

    /// Evidence linking an Ensembl gene to a disease.
    Pair {
        /// Ensembl gene id.
        gene: String,
        /// EFO code.
        disease: String,
    },

    /// Evidence documents by id.
    Ids {
        /// Evidence ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Evidence matching per-dimension filters.
    Filter {
        /// Gene identifiers (comma-separated).
        #[arg(long, value_delimiter = ',')]
        gene: Vec<String>,

        /// Operator combining the gene identifiers (AND, OR, NOT).
        #[arg(long, default_value = "OR")]
        gene_operator: String,

        /// Disease identifiers (comma-separated).
        #[arg(long, value_delimiter = ',')]
        object: Vec<String>,

        /// Operator combining the disease identifiers (AND, OR, NOT).
        #[arg(long, default_value = "OR")]
        object_operator: String,

        /// Evidence-type codes (comma-separated).
        #[arg(long, value_delimiter = ',')]
        evidence_type: Vec<String>,

        /// Operator combining the evidence-type codes (AND, OR, NOT).
        #[arg(long, default_value = "OR")]
        evidence_type_operator: String,
    },

    /// Fuzzy free-text search over genes and EFO terms.
    Search {
        /// Search phrase.
        phrase: String,

        /// Families to search (all, gene, efo).
        #[arg(long, default_value = "all")]
        scope: String,
    },

    /// Number of evidence documents per gene.
    AvailableGenes,

    /// Label of an EFO code.
    EfoLabel {
        /// EFO code.
        code: String,
    },

    /// EFO codes matching a label.
    EfoCodes {
        /// Label text.
        label: String,
    },

    /// ECO term for an evidence code.
    EcoLabel {
        /// ECO code.
        code: String,
    },
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            es_url: "http://localhost:9200".to_string(),
            es_username: None,
            es_password: None,
            data_version: "16.08_".to_string(),
            log_level: "info".to_string(),
            request_timeout_ms: 30000,
            size: None,
            from: None,
            format: "json".to_string(),
            data_structure: "full".to_string(),
        }
    }
}

impl CliConfig {
    /// Elasticsearch node URLs.
    pub fn nodes(&self) -> Vec<String> {
        self.es_url
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Index names for the configured data release.
    pub fn indices(&self) -> IndexConfig {
        IndexConfig::with_data_version(self.data_version.clone())
    }

    /// Normalized request options.
    pub fn search_params(&self) -> SearchParams {
        SearchParams::from_raw(&RawSearchParams {
            size: self.size.clone(),
            from: self.from.clone(),
            format: Some(self.format.clone()),
            datastructure: Some(self.data_structure.clone()),
            ..Default::default()
        })
    }

    /// Backend configuration.
    #[cfg(feature = "elasticsearch")]
    pub fn elasticsearch_config(&self) -> ElasticsearchConfig {
        let auth = match (&self.es_username, &self.es_password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ElasticsearchConfig {
            nodes: self.nodes(),
            indices: self.indices(),
            request_timeout_ms: self.request_timeout_ms,
            auth,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let nodes = self.nodes();
        if nodes.is_empty() {
            errors.push("At least one Elasticsearch URL is required".to_string());
        }
        for node in &nodes {
            if !node.starts_with("http://") && !node.starts_with("https://") {
                errors.push(format!("Elasticsearch URL must be http(s): {}", node));
            }
        }

        if self.request_timeout_ms == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.es_username.is_some() != self.es_password.is_some() {
            errors.push("Username and password must be set together".to_string());
        }

        if let Err(e) = self.format.parse::<OutputFormat>() {
            errors.push(e);
        }

        if let Err(e) = self.data_structure.parse::<DataStructure>() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            data_version: "test_".to_string(),
            log_level: "debug".to_string(),
            request_timeout_ms: 5000,
            ..Default::default()
        }
    }
}
