//! Staff account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new staff account
//! neurolab-cli staff create -u root -p 'a long passphrase' -e root@example.com
//!
//! # Promote an existing member to staff
//! neurolab-cli staff promote -u ada
//! ```

use thiserror::Error;

use neurolab_site::db::users::UserRepository;
use neurolab_site::models::user::{LabUserUpdate, NewLabUser};
use neurolab_site::services::auth::{AuthError, AuthService};

use super::CliError;

/// Errors that can occur during staff operations.
#[derive(Debug, Error)]
pub enum StaffError {
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(#[from] neurolab_site::db::RepositoryError),

    /// Account already exists.
    #[error("A user already exists with username: {0}")]
    UserExists(String),

    /// Account not found.
    #[error("No user with username: {0}")]
    UserNotFound(String),

    /// Password or registration failure.
    #[error("Auth error: {0}")]
    Auth(AuthError),
}

/// Create a new staff account.
///
/// # Errors
///
/// Returns `StaffError::UserExists` if the username is taken, or
/// `StaffError::Auth` if the password is rejected.
pub async fn create(username: &str, password: &str, email: &str) -> Result<i64, StaffError> {
    let pool = super::connect().await?;

    tracing::info!("Creating staff account: {}", username);

    let new_user = NewLabUser {
        username: username.to_owned(),
        email: email.to_owned(),
        is_staff: true,
        ..NewLabUser::default()
    };

    let user = AuthService::new(&pool)
        .register(&new_user, password)
        .await
        .map_err(|e| match e {
            AuthError::UsernameTaken => StaffError::UserExists(username.to_owned()),
            other => StaffError::Auth(other),
        })?;

    tracing::info!(
        "Staff account created! ID: {}, Username: {}",
        user.id,
        user.username
    );

    Ok(user.id.as_i64())
}

/// Promote an existing member to staff.
///
/// # Errors
///
/// Returns `StaffError::UserNotFound` if no such member exists.
pub async fn promote(username: &str) -> Result<(), StaffError> {
    let pool = super::connect().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| StaffError::UserNotFound(username.to_owned()))?;

    if user.is_staff {
        tracing::info!("{} is already staff", username);
        return Ok(());
    }

    let update = LabUserUpdate {
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        uni_email: user.uni_email.clone(),
        github_username: user.github_username.clone(),
        basecamp_id: user.basecamp_id.clone(),
        supervisor: user.supervisor.clone(),
        project_start_date: user.project_start_date,
        is_staff: true,
        is_active: user.is_active,
    };

    repo.update(user.id, &update).await?;

    tracing::info!("{} promoted to staff", username);
    Ok(())
}
