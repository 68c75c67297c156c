//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! neurolab-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `NEUROLAB_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/site/migrations/` and are embedded into
//! the binary at compile time.

use thiserror::Error;

use super::CliError;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending site migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
