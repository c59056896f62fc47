//! Satchel CLI - operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! satchel migrate
//!
//! # Create an account
//! satchel account create --email parent@example.com --password '...'
//! ```
//!
//! # Environment Variables
//!
//! - `SATCHEL_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

mod commands;

use clap::{Parser, Subcommand};

/// Satchel operational command-line tool.
#[derive(Parser)]
#[command(name = "satchel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations.
    Migrate,
    /// Account management.
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create a shopper account.
    Create {
        /// Email address for the new account.
        #[arg(long)]
        email: String,
        /// Password for the new account.
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satchel=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Account {
            command: AccountCommands::Create { email, password },
        } => commands::account::create(&email, &password).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}
