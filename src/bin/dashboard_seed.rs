//! dashboard-seed: load placeholder customers, invoices, revenue, users and
//! products into the configured database.

use clap::Parser;
use tracing::{error, info};

use invoice_dashboard::config::Config;
use invoice_dashboard::seed::seed_all;
use invoice_dashboard::storage::init_storage;
use invoice_dashboard::utils::bootstrap::init_tracing;

#[derive(Parser)]
#[command(name = "dashboard-seed")]
#[command(about = "Seed the invoice dashboard database with placeholder data")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "dashboard-seed failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?;
    let (storage, pool) = init_storage(&config.storage).await?;

    let result = seed_all(&storage).await;
    pool.close().await;

    let report = result?;
    info!(?report, "Seed complete");
    Ok(())
}
