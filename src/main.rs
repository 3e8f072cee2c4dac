use clap::{Parser, Subcommand};
use fundlink::config::AppConfig;
use fundlink::connectors::registry::SourceRegistry;
use fundlink::connectors::{factory, QueryParams};
use fundlink::logging;
use fundlink::projects::store::InMemoryProjectStore;
use fundlink::server::{start_server, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "fundlink")]
#[command(about = "Research project API with funding-registry connectors")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port override; defaults to the configured server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one connector and print the normalized records
    Fetch {
        /// Source identifier (case-insensitive), e.g. anr or CORDIS
        #[arg(long)]
        source: String,
        /// Free-text search forwarded to the registry
        #[arg(long)]
        query: Option<String>,
        /// Fetch a single page instead of traversing up to the bound
        #[arg(long)]
        page: Option<u32>,
    },
    /// List the registered source identifiers
    Sources,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let registry = Arc::new(SourceRegistry::from_sources(&config.sources));

    match cli.command {
        Commands::Serve { port } => {
            let state = AppState {
                registry,
                store: Arc::new(InMemoryProjectStore::new()),
                request_deadline: Duration::from_secs(config.server.request_deadline_seconds),
            };
            start_server(state, port.unwrap_or(config.server.port)).await?;
        }
        Commands::Fetch {
            source,
            query,
            page,
        } => {
            let source = source.to_uppercase();
            if !registry.is_registered(&source) {
                eprintln!(
                    "Unknown source '{}'. Valid sources: {}",
                    source,
                    registry.valid_sources().join(", ")
                );
                std::process::exit(1);
            }

            let mut params = QueryParams::new();
            if let Some(query) = query {
                params.insert("query".to_string(), query);
            }
            if let Some(page) = page {
                params.insert("page".to_string(), page.to_string());
            }

            let connector = factory::create(&source, &registry)?;
            let records = connector.fetch_projects(&params).await?;
            info!("Fetched {} records from {}", records.len(), source);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Sources => {
            for id in registry.valid_sources() {
                println!("{id}");
            }
        }
    }

    Ok(())
}
