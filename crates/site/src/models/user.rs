//! Lab member domain types.

use chrono::{DateTime, NaiveDate, Utc};

use neurolab_core::UserId;

/// A lab member account.
///
/// Optional profile fields follow the convention of the admin console:
/// "not provided" is the empty string, never NULL, except for the project
/// start date which is a real optional value.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LabUser {
    /// Unique user ID.
    pub id: UserId,
    /// Login name; unique and the display/sort key everywhere.
    pub username: String,
    /// Primary email address (may be empty).
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// University email, e.g. user@uni-osnabrueck.de (may be empty).
    pub uni_email: String,
    /// GitHub username (may be empty).
    pub github_username: String,
    /// Basecamp user ID (may be empty).
    pub basecamp_id: String,
    /// Name of the member's supervisor, free text (may be empty).
    pub supervisor: String,
    /// Start date of the member's project/position.
    pub project_start_date: Option<NaiveDate>,
    /// Whether the user may access the admin console.
    pub is_staff: bool,
    /// Inactive users cannot log in.
    pub is_active: bool,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl LabUser {
    /// First and last name joined, or the empty string if neither is set.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        name.trim().to_owned()
    }

    /// Display label: `username (Full Name)` or `username (No name)`.
    #[must_use]
    pub fn display_label(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            format!("{} (No name)", self.username)
        } else {
            format!("{} ({full})", self.username)
        }
    }
}

/// Fields accepted when creating a lab member.
///
/// The password is handled separately by the auth service; this struct only
/// carries profile data that goes into the `lab_user` row.
#[derive(Debug, Clone, Default)]
pub struct NewLabUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uni_email: String,
    pub github_username: String,
    pub basecamp_id: String,
    pub supervisor: String,
    pub project_start_date: Option<NaiveDate>,
    pub is_staff: bool,
}

/// Profile fields a member may edit for themselves.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub uni_email: String,
    pub github_username: String,
    pub basecamp_id: String,
}

/// Full field set editable from the admin console.
#[derive(Debug, Clone, Default)]
pub struct LabUserUpdate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uni_email: String,
    pub github_username: String,
    pub basecamp_id: String,
    pub supervisor: String,
    pub project_start_date: Option<NaiveDate>,
    pub is_staff: bool,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> LabUser {
        LabUser {
            id: UserId::new(1),
            username: "ada".to_owned(),
            email: String::new(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            uni_email: String::new(),
            github_username: String::new(),
            basecamp_id: String::new(),
            supervisor: String::new(),
            project_start_date: None,
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user("Ada", "Lovelace").full_name(), "Ada Lovelace");
        assert_eq!(user("Ada", "").full_name(), "Ada");
        assert_eq!(user("", "").full_name(), "");
    }

    #[test]
    fn test_display_label() {
        assert_eq!(user("Ada", "Lovelace").display_label(), "ada (Ada Lovelace)");
        assert_eq!(user("", "").display_label(), "ada (No name)");
    }
}
