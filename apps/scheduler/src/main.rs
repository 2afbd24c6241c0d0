use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod console;

use cli::{Cli, Commands};
use commands::Clinic;
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env();
    info!("Starting clinic scheduler");

    let clinic = Clinic::new(config);
    match cli.command {
        Commands::Book(args) => clinic.book(args).await,
        Commands::Reminders(args) => clinic.reminders(args).await,
        Commands::Slots { duration } => clinic.slots(duration).await,
        Commands::Report => clinic.report().await,
    }
}
