//! Registration route handlers.
//!
//! Creates a lab member account and immediately starts a session for it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, RegisterForm};
use crate::middleware::{OptionalUser, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub form: RegisterForm,
    pub errors: FormErrors,
}

/// Display the registration page.
pub async fn register_page(OptionalUser(user): OptionalUser) -> RegisterTemplate {
    RegisterTemplate {
        user,
        form: RegisterForm::default(),
        errors: FormErrors::default(),
    }
}

/// Handle registration form submission.
///
/// On success the new member is logged in and sent to the dashboard. On any
/// validation failure the form is re-rendered with inline errors and nothing
/// is written.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let (new_user, password) = match form.validate() {
        Ok(parsed) => parsed,
        Err(errors) => {
            return Ok(RegisterTemplate {
                user: None,
                form,
                errors,
            }
            .into_response());
        }
    };

    let user = match AuthService::new(state.pool())
        .register(&new_user, &password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::UsernameTaken) => {
            let mut errors = FormErrors::default();
            errors.add("username", "A user with that username already exists.");
            return Ok(RegisterTemplate {
                user: None,
                form,
                errors,
            }
            .into_response());
        }
        Err(AuthError::WeakPassword(msg)) => {
            let mut errors = FormErrors::default();
            errors.add("password2", msg);
            return Ok(RegisterTemplate {
                user: None,
                form,
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
        tracing::error!("Failed to set session after registration: {}", e);
        return Ok(Redirect::to("/accounts/login").into_response());
    }

    tracing::info!(username = %user.username, "New member registered");

    Ok(Redirect::to("/").into_response())
}
