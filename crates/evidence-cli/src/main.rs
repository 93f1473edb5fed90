//! Helios Evidence CLI
//!
//! Runs one evidence query and prints the rendered result.

mod config;

use clap::Parser;
use helios_evidence::core::SearchBackend;
use helios_evidence::search::FreeTextScope;
use helios_evidence::types::{FilterDimension, FilterSet, SearchParams};
use helios_evidence::{EvidenceService, Vocabulary};
use tracing::info;

use crate::config::{Cli, Command};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the library logs at `level`.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_evidence={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Runs a command and returns the text to print.
async fn run<B: SearchBackend>(
    service: &EvidenceService<B>,
    command: Command,
    params: &SearchParams,
) -> anyhow::Result<String> {
    let result = match command {
        Command::Gene { gene } => service.evidence_for_gene(&gene, params).await?,
        Command::Disease { code } => service.evidence_for_disease(&code, params).await?,
        Command::Pair { gene, disease } => {
            service
                .evidence_for_gene_and_disease(&gene, &disease, params)
                .await?
        }
        Command::Ids { ids } => service.evidence_by_ids(&ids, params).await?,
        Command::Filter {
            gene,
            gene_operator,
            object,
            object_operator,
            evidence_type,
            evidence_type_operator,
        } => {
            let filters = FilterSet::new()
                .with_named(FilterDimension::Gene, gene, &gene_operator)?
                .with_named(FilterDimension::Object, object, &object_operator)?
                .with_named(
                    FilterDimension::EvidenceType,
                    evidence_type,
                    &evidence_type_operator,
                )?;
            service.evidences(&filters, params).await?
        }
        Command::Search { phrase, scope } => {
            let scope: FreeTextScope = scope.parse().map_err(anyhow::Error::msg)?;
            service.free_text_search(&phrase, scope, params).await?
        }
        Command::AvailableGenes => service.available_genes(params).await?,
        Command::EfoLabel { code } => {
            service
                .label_for_code(Vocabulary::Efo, &code, params)
                .await?
        }
        Command::EfoCodes { label } => {
            return Ok(service.efo_codes_from_label(&label).await?.join("\n"));
        }
        Command::EcoLabel { code } => {
            service
                .label_for_code(Vocabulary::Eco, &code, params)
                .await?
        }
    };

    info!(
        total = result.total(),
        took_ms = result.took_ms(),
        "Query complete"
    );
    Ok(result.render()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let params = cli.config.search_params();
    let output = query(&cli, params).await?;
    println!("{}", output);
    Ok(())
}

/// Runs the command against Elasticsearch.
#[cfg(feature = "elasticsearch")]
async fn query(cli: &Cli, params: SearchParams) -> anyhow::Result<String> {
    use helios_evidence::backends::elasticsearch::ElasticsearchBackend;

    let backend = ElasticsearchBackend::new(cli.config.elasticsearch_config())?;
    info!(
        nodes = ?backend.config().nodes,
        data_version = %cli.config.data_version,
        "Starting evidence query"
    );
    let service = EvidenceService::new(backend);
    run(&service, cli.command.clone(), &params).await
}

/// Fallback when the elasticsearch feature is not enabled.
#[cfg(not(feature = "elasticsearch"))]
async fn query(_cli: &Cli, _params: SearchParams) -> anyhow::Result<String> {
    anyhow::bail!(
        "The evidence CLI requires the 'elasticsearch' feature. \
         Build with: cargo build -p helios-evidence-cli --features elasticsearch"
    )
}
