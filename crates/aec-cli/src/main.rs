use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "aec-cli")]
#[command(about = "Collects AI conferences and summits into a deduplicated catalog")]
struct Cli {
    /// Catalog file to update (defaults to AEC_CATALOG_PATH or docs/events_data.json).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load, collect, merge, sort and save the catalog.
    Sync,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aec=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            let summary = aec_sync::run_reconcile_from_env(cli.catalog).await?;
            println!("{summary}");
        }
    }

    Ok(())
}
