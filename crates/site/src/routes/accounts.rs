//! Account route handlers: login, logout, password change, own profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, LoginForm, NON_FIELD, PasswordChangeForm, ProfileForm};
use crate::middleware::{OptionalUser, RequireUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Where to go after a successful login.
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub form: LoginForm,
    pub errors: FormErrors,
}

/// Password change page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/password_change.html")]
pub struct PasswordChangeTemplate {
    pub user: Option<CurrentUser>,
    pub errors: FormErrors,
    pub changed: bool,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/profile.html")]
pub struct ProfileTemplate {
    pub user: Option<CurrentUser>,
    pub form: ProfileForm,
    pub errors: FormErrors,
    pub saved: bool,
}

/// Only allow same-site relative redirect targets.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

// =============================================================================
// Login / logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalUser(user): OptionalUser,
    Query(query): Query<LoginQuery>,
) -> LoginTemplate {
    LoginTemplate {
        user,
        form: LoginForm {
            next: query.next.unwrap_or_default(),
            ..LoginForm::default()
        },
        errors: FormErrors::default(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials | AuthError::AccountDisabled) => {
            let mut errors = FormErrors::default();
            errors.add(
                NON_FIELD,
                "Please enter a correct username and password. Note that both fields \
                 may be case-sensitive.",
            );
            return Ok(LoginTemplate {
                user: None,
                form: LoginForm {
                    password: String::new(),
                    ..form
                },
                errors,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let current_user = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        is_staff: user.is_staff,
    };

    if let Err(e) = set_current_user(&session, &current_user).await {
        tracing::error!("Failed to set session: {}", e);
        return Err(AppError::Internal("session write failed".to_owned()));
    }

    Ok(Redirect::to(safe_next(&form.next)).into_response())
}

/// Handle logout.
///
/// Clears the current user and destroys the whole session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Password change
// =============================================================================

/// Display the password change page.
pub async fn password_change_page(RequireUser(user): RequireUser) -> PasswordChangeTemplate {
    PasswordChangeTemplate {
        user: Some(user),
        errors: FormErrors::default(),
        changed: false,
    }
}

/// Handle password change form submission.
pub async fn password_change(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return Ok(PasswordChangeTemplate {
            user: Some(user),
            errors,
            changed: false,
        }
        .into_response());
    }

    match AuthService::new(state.pool())
        .change_password(user.id, &form.old_password, &form.new_password1)
        .await
    {
        Ok(()) => Ok(PasswordChangeTemplate {
            user: Some(user),
            errors: FormErrors::default(),
            changed: true,
        }
        .into_response()),
        Err(AuthError::InvalidCredentials) => {
            let mut errors = FormErrors::default();
            errors.add(
                "old_password",
                "Your old password was entered incorrectly. Please enter it again.",
            );
            Ok(PasswordChangeTemplate {
                user: Some(user),
                errors,
                changed: false,
            }
            .into_response())
        }
        Err(AuthError::WeakPassword(msg)) => {
            let mut errors = FormErrors::default();
            errors.add("new_password2", msg);
            Ok(PasswordChangeTemplate {
                user: Some(user),
                errors,
                changed: false,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Own profile
// =============================================================================

/// Display the member's own profile form.
pub async fn profile_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<ProfileTemplate, AppError> {
    let record = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(ProfileTemplate {
        form: ProfileForm::from_user(&record),
        user: Some(user),
        errors: FormErrors::default(),
        saved: false,
    })
}

/// Handle profile form submission.
pub async fn profile_update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => {
            return Ok(ProfileTemplate {
                user: Some(user),
                form,
                errors,
                saved: false,
            }
            .into_response());
        }
    };

    UserRepository::new(state.pool())
        .update_profile(user.id, &update)
        .await?;

    Ok(ProfileTemplate {
        user: Some(user),
        form,
        errors: FormErrors::default(),
        saved: true,
    }
    .into_response())
}
