//! CLI subcommand implementations.

pub mod account;
pub mod migrate;

use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Authentication/account error.
    #[error("Account error: {0}")]
    Auth(#[from] satchel_storefront::services::AuthError),
}

/// Resolve the database URL from the environment.
///
/// Tries `SATCHEL_DATABASE_URL` first, then the generic `DATABASE_URL`.
pub fn database_url() -> Result<String, CommandError> {
    std::env::var("SATCHEL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("SATCHEL_DATABASE_URL"))
}
