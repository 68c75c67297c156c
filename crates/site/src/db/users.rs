//! User repository for database operations.
//!
//! Provides database access for lab member accounts and their password
//! hashes. Password hashes live in a separate `lab_user_password` table so
//! profile reads never touch credential material.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use neurolab_core::UserId;

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{LabUser, LabUserUpdate, NewLabUser, ProfileUpdate};

/// Columns selected for a full `LabUser` row.
const USER_COLUMNS: &str = "id, username, email, first_name, last_name, uni_email, \
     github_username, basecamp_id, supervisor, project_start_date, \
     is_staff, is_active, date_joined";

/// Filters accepted by the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserListFilter {
    /// Search term matched against username, emails and names.
    pub q: Option<String>,
    pub staff: Option<bool>,
    pub active: Option<bool>,
    /// Exact supervisor name.
    pub supervisor: Option<String>,
}

/// Repository for lab member database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<LabUser>, RepositoryError> {
        let user = sqlx::query_as::<_, LabUser>(&format!(
            "SELECT {USER_COLUMNS} FROM lab_user WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<LabUser>, RepositoryError> {
        let user = sqlx::query_as::<_, LabUser>(&format!(
            "SELECT {USER_COLUMNS} FROM lab_user WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user together with their password hash.
    ///
    /// The profile row and the password row are written in one transaction:
    /// either the account fully exists or not at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        new_user: &NewLabUser,
        password_hash: &str,
    ) -> Result<LabUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let date_joined = Utc::now();

        let result = sqlx::query(
            "INSERT INTO lab_user \
             (username, email, first_name, last_name, uni_email, github_username, \
              basecamp_id, supervisor, project_start_date, is_staff, is_active, date_joined) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, TRUE, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.uni_email)
        .bind(&new_user.github_username)
        .bind(&new_user.basecamp_id)
        .bind(&new_user.supervisor)
        .bind(new_user.project_start_date)
        .bind(new_user.is_staff)
        .bind(date_joined)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        let id = UserId::new(result.last_insert_rowid());

        sqlx::query("INSERT INTO lab_user_password (user_id, password_hash) VALUES (?, ?)")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(LabUser {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            uni_email: new_user.uni_email.clone(),
            github_username: new_user.github_username.clone(),
            basecamp_id: new_user.basecamp_id.clone(),
            supervisor: new_user.supervisor.clone(),
            project_start_date: new_user.project_start_date,
            is_staff: new_user.is_staff,
            is_active: true,
            date_joined,
        })
    }

    /// Get a user and their password hash by username.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(LabUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, PasswordRow>(&format!(
            "SELECT {USER_COLUMNS}, \
             (SELECT password_hash FROM lab_user_password p WHERE p.user_id = lab_user.id) \
                 AS password_hash \
             FROM lab_user WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(hash) = row.password_hash else {
            return Ok(None);
        };

        Ok(Some((row.user, hash)))
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO lab_user_password (user_id, password_hash) VALUES (?, ?) \
             ON CONFLICT (user_id) DO UPDATE SET password_hash = excluded.password_hash",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Update a member's self-editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE lab_user SET first_name = ?, last_name = ?, email = ?, \
             uni_email = ?, github_username = ?, basecamp_id = ? WHERE id = ?",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.uni_email)
        .bind(&update.github_username)
        .bind(&update.basecamp_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Update the full admin-editable field set of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new username is taken.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        user_id: UserId,
        update: &LabUserUpdate,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE lab_user SET username = ?, email = ?, first_name = ?, last_name = ?, \
             uni_email = ?, github_username = ?, basecamp_id = ?, supervisor = ?, \
             project_start_date = ?, is_staff = ?, is_active = ? WHERE id = ?",
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.uni_email)
        .bind(&update.github_username)
        .bind(&update.basecamp_id)
        .bind(&update.supervisor)
        .bind(update.project_start_date)
        .bind(update.is_staff)
        .bind(update.is_active)
        .bind(user_id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user.
    ///
    /// The password row goes with the account (enforced by the schema).
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM lab_user WHERE id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List users for the admin console, filtered and ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &UserListFilter) -> Result<Vec<LabUser>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM lab_user WHERE 1 = 1"));

        if let Some(staff) = filter.staff {
            qb.push(" AND is_staff = ").push_bind(staff);
        }
        if let Some(active) = filter.active {
            qb.push(" AND is_active = ").push_bind(active);
        }
        if let Some(ref supervisor) = filter.supervisor {
            qb.push(" AND supervisor = ").push_bind(supervisor.clone());
        }
        if let Some(ref q) = filter.q {
            let pattern = format!("%{q}%");
            qb.push(" AND (username LIKE ")
                .push_bind(pattern.clone())
                .push(" OR email LIKE ")
                .push_bind(pattern.clone())
                .push(" OR uni_email LIKE ")
                .push_bind(pattern.clone())
                .push(" OR first_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(" ORDER BY username ASC");

        let users = qb.build_query_as::<LabUser>().fetch_all(self.pool).await?;
        Ok(users)
    }

    /// Distinct non-empty supervisor names, for the admin filter dropdown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_supervisors(&self) -> Result<Vec<String>, RepositoryError> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT supervisor FROM lab_user \
             WHERE supervisor <> '' ORDER BY supervisor ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(names)
    }

    /// Total number of accounts (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lab_user")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Row shape for the username + password-hash lookup.
#[derive(sqlx::FromRow)]
struct PasswordRow {
    #[sqlx(flatten)]
    user: LabUser,
    password_hash: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewLabUser {
        NewLabUser {
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            supervisor: "Prof. Pipa".to_owned(),
            ..NewLabUser::default()
        }
    }

    #[sqlx::test]
    async fn test_create_and_get(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);

        let created = repo.create(&new_user("ada"), "hash").await.unwrap();
        assert_eq!(created.username, "ada");
        assert!(created.is_active);

        let fetched = repo.get_by_username("ada").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, "ada@example.com");

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "ada");
    }

    #[sqlx::test]
    async fn test_duplicate_username_is_conflict(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);

        repo.create(&new_user("ada"), "hash").await.unwrap();
        let err = repo.create(&new_user("ada"), "hash2").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // The failed attempt must not leave any partial state behind.
        let count = repo.count().await.unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    async fn test_password_hash_roundtrip(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);
        let created = repo.create(&new_user("ada"), "first-hash").await.unwrap();

        let (user, hash) = repo.get_password_hash("ada").await.unwrap().unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(hash, "first-hash");

        repo.set_password(created.id, "second-hash").await.unwrap();
        let (_, hash) = repo.get_password_hash("ada").await.unwrap().unwrap();
        assert_eq!(hash, "second-hash");
    }

    #[sqlx::test]
    async fn test_list_orders_by_username(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);

        // Insertion order deliberately unsorted.
        for name in ["charlie", "ada", "bert"] {
            repo.create(&new_user(name), "hash").await.unwrap();
        }

        let users = repo.list(&UserListFilter::default()).await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["ada", "bert", "charlie"]);
    }

    #[sqlx::test]
    async fn test_list_filters(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);

        let mut staff = new_user("root");
        staff.is_staff = true;
        staff.supervisor = String::new();
        repo.create(&staff, "hash").await.unwrap();
        repo.create(&new_user("ada"), "hash").await.unwrap();

        let filter = UserListFilter {
            staff: Some(true),
            ..UserListFilter::default()
        };
        let users = repo.list(&filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.first().unwrap().username, "root");

        let filter = UserListFilter {
            supervisor: Some("Prof. Pipa".to_owned()),
            ..UserListFilter::default()
        };
        let users = repo.list(&filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.first().unwrap().username, "ada");

        let filter = UserListFilter {
            q: Some("ada@example".to_owned()),
            ..UserListFilter::default()
        };
        let users = repo.list(&filter).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[sqlx::test]
    async fn test_delete(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);
        let created = repo.create(&new_user("ada"), "hash").await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_username("ada").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_list_supervisors_distinct(pool: SqlitePool) {
        let repo = UserRepository::new(&pool);
        repo.create(&new_user("ada"), "hash").await.unwrap();
        repo.create(&new_user("bert"), "hash").await.unwrap();

        let supervisors = repo.list_supervisors().await.unwrap();
        assert_eq!(supervisors, vec!["Prof. Pipa".to_owned()]);
    }
}
