//! Database operations for the NeuroLab `SQLite` store.
//!
//! # Tables
//!
//! - `lab_user` - Lab member accounts
//! - `lab_user_password` - Password hashes (separate from the profile row)
//! - `toolkit` / `studio` / `workflow` - The catalog hierarchy
//! - `dataset` - Dataset catalog entries (independent of the hierarchy)
//! - `tower_sessions` - Session storage (created by the session store itself)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p neurolab-cli -- migrate
//! ```

pub mod catalog;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use catalog::CatalogRepository;
pub use users::UserRepository;

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Foreign keys are enforced on every connection; the database file is
/// created on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Errors returned by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated (duplicate username or slug).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,

    /// A stored value failed to round-trip into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Map a sqlx error to `Conflict` when it is a uniqueness violation.
///
/// Used by create/update operations so duplicate slugs and usernames become
/// recoverable form errors instead of opaque database failures.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
