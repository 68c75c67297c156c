//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod staff;

use secrecy::SecretString;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors shared by the database-backed commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the database named by `NEUROLAB_DATABASE_URL` (or
/// `DATABASE_URL`).
pub(crate) async fn connect() -> Result<SqlitePool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("NEUROLAB_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("NEUROLAB_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = neurolab_site::db::create_pool(&database_url).await?;
    Ok(pool)
}
