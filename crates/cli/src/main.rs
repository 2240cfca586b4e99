//! Chronify CLI - database migrations and stock reports.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! chronify migrate
//!
//! # Print inventory totals
//! chronify report
//!
//! # Also list the parts that are running low
//! chronify report --low-stock
//! ```
//!
//! Both commands read `CHRONIFY_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chronify")]
#[command(author, version, about = "Chronify CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Print the inventory metrics shown on the dashboard home page
    Report {
        /// List parts below the low-stock threshold
        #[arg(long)]
        low_stock: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Report { low_stock } => commands::report::run(low_stock).await?,
    }
    Ok(())
}
