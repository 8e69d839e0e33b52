//! Akinator game client (v1)
//!
//! Command line front end over the server locator.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI ──▶ ServerLocator ──▶ DirectoryFetcher ──▶ directory XML
//!                │                                 (once per process)
//!                ├──▶ ServerCache (DashMap + health flags)
//!                └──▶ HealthProber ──▶ {server}/answer
//!                         │
//!                         ▼
//!                 first healthy ServerDescriptor ──▶ JSON on stdout
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use akinator_client::config::{load_config, ClientConfig};
use akinator_client::observability::logging::init_logging;
use akinator_client::{Language, ServerLocator, ServerType};

#[derive(Parser)]
#[command(name = "akinator-client")]
#[command(about = "Locate healthy Akinator game servers", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a healthy server for a language
    Search {
        /// Two-letter language code
        #[arg(short, long)]
        language: Language,
        /// Server type name or numeric code
        #[arg(long)]
        category: Option<ServerType>,
    },
    /// Find one healthy server per server type
    All {
        #[arg(short, long)]
        language: Language,
    },
    /// Find a healthy server of a logical base
    Base { base_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    init_logging(&config.observability.log_filter);

    tracing::info!(
        directory = %config.discovery.url,
        probe_path = %config.health_check.path,
        timing = config.observability.timing_enabled,
        "Configuration loaded"
    );

    let locator = ServerLocator::from_config(&config)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling search");
                cancel.cancel();
            }
        });
    }

    let output = match cli.command {
        Commands::Search { language, category } => {
            let server = match category {
                Some(server_type) => locator.search(language, server_type, &cancel).await?,
                None => locator.search_language(language, &cancel).await?,
            };
            serde_json::to_string_pretty(&server)?
        }
        Commands::All { language } => {
            let servers = locator.search_all(language, &cancel).await?;
            serde_json::to_string_pretty(&servers)?
        }
        Commands::Base { base_id } => {
            let server = locator.search_by_base(&base_id, &cancel).await?;
            serde_json::to_string_pretty(&server)?
        }
    };
    println!("{}", output);

    tracing::info!(cached = locator.cached_count(), "Done");
    Ok(())
}
