//! Authentication service.
//!
//! Username/password authentication with Argon2id hashing. Registration and
//! login both go through here; route handlers only see domain types and
//! `AuthError`.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use neurolab_core::UserId;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{LabUser, NewLabUser};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Wrong username or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but is deactivated.
    #[error("account is inactive")]
    AccountDisabled,

    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Authentication service.
///
/// Handles member registration, login, and password changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new member with a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet
    /// requirements. Returns `AuthError::UsernameTaken` if the username is
    /// already registered.
    pub async fn register(
        &self,
        new_user: &NewLabUser,
        password: &str,
    ) -> Result<LabUser, AuthError> {
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is
    /// wrong. Returns `AuthError::AccountDisabled` for deactivated accounts.
    pub async fn login(&self, username: &str, password: &str) -> Result<LabUser, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    /// Change a member's password, verifying the current one first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong. Returns `AuthError::WeakPassword` if the new password doesn't
    /// meet requirements.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let (_, password_hash) = self
            .users
            .get_password_hash(&user.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(current_password, &password_hash)?;
        validate_password(new_password)?;

        let new_hash = hash_password(new_password)?;
        self.users.set_password(user_id, &new_hash).await?;

        Ok(())
    }

    /// Set a member's password without verifying the old one (admin/CLI use).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet
    /// requirements. Returns `AuthError::Repository` on database failure.
    pub async fn set_password(&self, user_id: UserId, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let hash = hash_password(password)?;
        self.users.set_password(user_id, &hash).await?;
        Ok(())
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with a user-facing message.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "This password is entirely numeric.".to_owned(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewLabUser {
        NewLabUser {
            username: username.to_owned(),
            ..NewLabUser::default()
        }
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_numeric() {
        assert!(matches!(
            validate_password("1234567890"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("correct horse battery").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[sqlx::test]
    async fn test_register_and_login(pool: SqlitePool) {
        let auth = AuthService::new(&pool);

        let user = auth
            .register(&new_user("ada"), "correct horse battery")
            .await
            .unwrap();
        assert_eq!(user.username, "ada");

        let logged_in = auth.login("ada", "correct horse battery").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            auth.login("ada", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "correct horse battery").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[sqlx::test]
    async fn test_register_duplicate_username(pool: SqlitePool) {
        let auth = AuthService::new(&pool);

        auth.register(&new_user("ada"), "correct horse battery")
            .await
            .unwrap();
        assert!(matches!(
            auth.register(&new_user("ada"), "correct horse battery")
                .await,
            Err(AuthError::UsernameTaken)
        ));
    }

    #[sqlx::test]
    async fn test_change_password(pool: SqlitePool) {
        let auth = AuthService::new(&pool);
        let user = auth
            .register(&new_user("ada"), "correct horse battery")
            .await
            .unwrap();

        // Wrong current password is rejected.
        assert!(matches!(
            auth.change_password(user.id, "wrong", "another fine phrase")
                .await,
            Err(AuthError::InvalidCredentials)
        ));

        auth.change_password(user.id, "correct horse battery", "another fine phrase")
            .await
            .unwrap();

        assert!(auth.login("ada", "another fine phrase").await.is_ok());
        assert!(auth.login("ada", "correct horse battery").await.is_err());
    }
}
