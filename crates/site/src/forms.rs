//! Form parsing and validation.
//!
//! Every POSTed form has a `Deserialize` struct (all fields default so a
//! missing input never 422s) and a `validate()` that either produces domain
//! input or a [`FormErrors`] map rendered inline next to each field.
//! Validation failures never write any state.

use chrono::NaiveDate;
use serde::Deserialize;

use neurolab_core::{Email, Slug};

use crate::models::user::{NewLabUser, ProfileUpdate};
use crate::services::auth;

/// Pseudo-field for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

/// Per-field validation error messages.
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    errors: Vec<(String, String)>,
}

impl FormErrors {
    /// Record an error message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push((field.to_owned(), message.into()));
    }

    /// True when validation produced no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when the given field has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|(f, _)| f == field)
    }

    /// All messages for a field, joined for display. Empty when clean.
    #[must_use]
    pub fn field(&self, field: &str) -> String {
        self.errors
            .iter()
            .filter(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// All `(field, message)` pairs in insertion order.
    #[must_use]
    pub fn all(&self) -> &[(String, String)] {
        &self.errors
    }
}

// =============================================================================
// Shared validators
// =============================================================================

/// Validate a username the way the registration form expects it.
///
/// Required; at most 150 characters; letters, digits and `@.+-_` only.
pub(crate) fn validate_username(username: &str, errors: &mut FormErrors) {
    if username.is_empty() {
        errors.add("username", "This field is required.");
        return;
    }
    if username.len() > 150 {
        errors.add("username", "Ensure this value has at most 150 characters.");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, \
             and @/./+/-/_ characters.",
        );
    }
}

/// Validate an email field that may be left blank.
pub(crate) fn validate_optional_email(field: &str, value: &str, errors: &mut FormErrors) {
    if !value.is_empty() && Email::parse(value).is_err() {
        errors.add(field, "Enter a valid email address.");
    }
}

/// Parse an optional ISO date field (`""` means none).
pub(crate) fn parse_optional_date(
    field: &str,
    value: &str,
    errors: &mut FormErrors,
) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Enter a valid date.");
            None
        }
    }
}

/// Resolve the slug for an admin form: parse the field when given,
/// derive it from the name when left blank.
pub(crate) fn resolve_slug(slug_raw: &str, name: &str, errors: &mut FormErrors) -> Option<Slug> {
    if slug_raw.is_empty() {
        match Slug::slugify(name) {
            Ok(slug) => Some(slug),
            Err(_) => {
                errors.add("slug", "This field is required.");
                None
            }
        }
    } else {
        match Slug::parse(slug_raw) {
            Ok(slug) => Some(slug),
            Err(_) => {
                errors.add(
                    "slug",
                    "Enter a valid slug consisting of lowercase letters, numbers, \
                     underscores or hyphens.",
                );
                None
            }
        }
    }
}

/// Validate a pair of password fields (match + strength).
pub(crate) fn validate_password_pair(
    field1: &str,
    password1: &str,
    field2: &str,
    password2: &str,
    errors: &mut FormErrors,
) {
    if password1.is_empty() {
        errors.add(field1, "This field is required.");
        return;
    }
    if password1 != password2 {
        errors.add(field2, "The two password fields didn't match.");
        return;
    }
    if let Err(auth::AuthError::WeakPassword(msg)) = auth::validate_password(password1) {
        errors.add(field2, msg);
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub uni_email: String,
    #[serde(default)]
    pub github_username: String,
    #[serde(default)]
    pub basecamp_id: String,
    #[serde(default)]
    pub supervisor: String,
    #[serde(default)]
    pub project_start_date: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl RegisterForm {
    /// Validate and convert into a new-user record plus the raw password.
    ///
    /// # Errors
    ///
    /// Returns the per-field error map on any validation failure.
    pub fn validate(&self) -> Result<(NewLabUser, String), FormErrors> {
        let mut errors = FormErrors::default();

        validate_username(&self.username, &mut errors);
        validate_optional_email("email", &self.email, &mut errors);
        validate_optional_email("uni_email", &self.uni_email, &mut errors);
        let project_start_date =
            parse_optional_date("project_start_date", &self.project_start_date, &mut errors);
        validate_password_pair(
            "password1",
            &self.password1,
            "password2",
            &self.password2,
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok((
            NewLabUser {
                username: self.username.clone(),
                email: self.email.clone(),
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                uni_email: self.uni_email.clone(),
                github_username: self.github_username.clone(),
                basecamp_id: self.basecamp_id.clone(),
                supervisor: self.supervisor.clone(),
                project_start_date,
                is_staff: false,
            },
            self.password1.clone(),
        ))
    }
}

// =============================================================================
// Login / password change / profile
// =============================================================================

/// Login form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Where to go after a successful login.
    #[serde(default)]
    pub next: String,
}

/// Password change form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}

impl PasswordChangeForm {
    /// Validate the new password pair (the old one is checked against the
    /// stored hash by the auth service).
    ///
    /// # Errors
    ///
    /// Returns the per-field error map on any validation failure.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.old_password.is_empty() {
            errors.add("old_password", "This field is required.");
        }
        validate_password_pair(
            "new_password1",
            &self.new_password1,
            "new_password2",
            &self.new_password2,
            &mut errors,
        );

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Profile form data (member self-service).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub uni_email: String,
    #[serde(default)]
    pub github_username: String,
    #[serde(default)]
    pub basecamp_id: String,
}

impl ProfileForm {
    /// Validate and convert into a profile update.
    ///
    /// # Errors
    ///
    /// Returns the per-field error map on any validation failure.
    pub fn validate(&self) -> Result<ProfileUpdate, FormErrors> {
        let mut errors = FormErrors::default();

        validate_optional_email("email", &self.email, &mut errors);
        validate_optional_email("uni_email", &self.uni_email, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProfileUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            uni_email: self.uni_email.clone(),
            github_username: self.github_username.clone(),
            basecamp_id: self.basecamp_id.clone(),
        })
    }

    /// Pre-fill from an existing user row (GET requests).
    #[must_use]
    pub fn from_user(user: &crate::models::LabUser) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            uni_email: user.uni_email.clone(),
            github_username: user.github_username.clone(),
            basecamp_id: user.basecamp_id.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_register_form() -> RegisterForm {
        RegisterForm {
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            uni_email: "ada@uni-osnabrueck.de".to_owned(),
            supervisor: "Prof. Pipa".to_owned(),
            project_start_date: "2026-04-01".to_owned(),
            password1: "correct horse battery".to_owned(),
            password2: "correct horse battery".to_owned(),
            ..RegisterForm::default()
        }
    }

    #[test]
    fn test_register_valid() {
        let (new_user, password) = valid_register_form().validate().unwrap();
        assert_eq!(new_user.username, "ada");
        assert_eq!(
            new_user.project_start_date,
            Some(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
        );
        assert!(!new_user.is_staff);
        assert_eq!(password, "correct horse battery");
    }

    #[test]
    fn test_register_missing_username() {
        let form = RegisterForm {
            username: String::new(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("username"));
        assert_eq!(errors.field("username"), "This field is required.");
    }

    #[test]
    fn test_register_bad_username_characters() {
        let form = RegisterForm {
            username: "ada lovelace".to_owned(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("username"));
    }

    #[test]
    fn test_register_bad_email() {
        let form = RegisterForm {
            email: "not-an-email".to_owned(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("email"), "Enter a valid email address.");
    }

    #[test]
    fn test_register_password_mismatch() {
        let form = RegisterForm {
            password2: "different".to_owned(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.field("password2"),
            "The two password fields didn't match."
        );
    }

    #[test]
    fn test_register_short_password() {
        let form = RegisterForm {
            password1: "short".to_owned(),
            password2: "short".to_owned(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("password2"));
    }

    #[test]
    fn test_register_numeric_password() {
        let form = RegisterForm {
            password1: "8675309867".to_owned(),
            password2: "8675309867".to_owned(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("password2"), "This password is entirely numeric.");
    }

    #[test]
    fn test_register_bad_date() {
        let form = RegisterForm {
            project_start_date: "01.04.2026".to_owned(),
            ..valid_register_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("project_start_date"), "Enter a valid date.");
    }

    #[test]
    fn test_resolve_slug_from_name_when_blank() {
        let mut errors = FormErrors::default();
        let slug = resolve_slug("", "Spike Sorting", &mut errors).unwrap();
        assert_eq!(slug.as_str(), "spike-sorting");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_resolve_slug_explicit() {
        let mut errors = FormErrors::default();
        let slug = resolve_slug("custom-slug", "Whatever", &mut errors).unwrap();
        assert_eq!(slug.as_str(), "custom-slug");
    }

    #[test]
    fn test_resolve_slug_invalid() {
        let mut errors = FormErrors::default();
        assert!(resolve_slug("Not A Slug", "name", &mut errors).is_none());
        assert!(errors.has("slug"));
    }

    #[test]
    fn test_password_change_requires_old() {
        let form = PasswordChangeForm {
            new_password1: "correct horse battery".to_owned(),
            new_password2: "correct horse battery".to_owned(),
            ..PasswordChangeForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("old_password"));
    }

    #[test]
    fn test_form_errors_accessors() {
        let mut errors = FormErrors::default();
        assert!(errors.is_empty());
        errors.add("username", "This field is required.");
        errors.add(NON_FIELD, "Something else.");
        assert!(errors.has("username"));
        assert!(!errors.has("email"));
        assert_eq!(errors.field(NON_FIELD), "Something else.");
        assert_eq!(errors.all().len(), 2);
    }
}
