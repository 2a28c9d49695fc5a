//! dashboard-server: the invoice dashboard HTTP server.
//!
//! ## Configuration
//! - DASHBOARD_CONFIG: path to a YAML config file (optional)
//! - DASHBOARD__SECTION__KEY: per-field overrides, e.g. DASHBOARD__SERVER__PORT
//! - DATABASE_URL: database URI, overriding the configured one
//! - DASHBOARD_SESSION_SECRET: session signing secret
//! - DASHBOARD_LOG: tracing filter (default: info)

use clap::Parser;
use tracing::{error, info};

use invoice_dashboard::config::Config;
use invoice_dashboard::storage::init_storage;
use invoice_dashboard::utils::bootstrap::{init_tracing, shutdown_signal};
use invoice_dashboard::web::{serve, AppState};

#[derive(Parser)]
#[command(name = "dashboard-server")]
#[command(about = "Invoice and customer dashboard server")]
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
        error!(error = %e, "dashboard-server failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load(cli.config.as_deref())?;
    info!(
        address = %config.server.bind_address(),
        storage_type = %config.storage.storage_type,
        "Starting dashboard-server"
    );

    let (storage, pool) = init_storage(&config.storage).await?;
    let state = AppState::new(config, storage)?;

    let result = serve(state, shutdown_signal()).await;
    pool.close().await;
    info!("dashboard-server stopped");
    result
}
