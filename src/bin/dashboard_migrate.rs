//! dashboard-migrate: apply or inspect schema migrations.

use clap::{Parser, Subcommand};
use tracing::{error, info};

use invoice_dashboard::config::Config;
use invoice_dashboard::storage::{migrate, DatabasePool};
use invoice_dashboard::utils::bootstrap::init_tracing;

#[derive(Parser)]
#[command(name = "dashboard-migrate")]
#[command(about = "Schema migrations for the invoice dashboard")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up,
    /// Show applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "dashboard-migrate failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?;
    let pool = DatabasePool::connect(&config.storage).await?;

    let result = match cli.command {
        Commands::Up => migrate::run(&pool).await.map(|()| {
            info!("Migrations applied");
        }),
        Commands::Status => migrate::status(&pool).await.map(|migrations| {
            for m in migrations {
                let state = if m.applied { "applied" } else { "pending" };
                println!("{:>14}  {:<8}  {}", m.version, state, m.description);
            }
        }),
    };

    pool.close().await;
    Ok(result?)
}
