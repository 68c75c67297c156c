//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in member (or a staff member,
//! for the admin console) in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::session::{CurrentUser, keys};

/// Write the logged-in user into the session.
///
/// # Errors
///
/// Returns the session store error if the write fails.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session.
///
/// # Errors
///
/// Returns the session store error if the write fails.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}

/// Error returned when authentication is required but absent.
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// Logged in, but not allowed here.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/accounts/login").into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Extractor that requires a logged-in member.
///
/// If nobody is logged in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user_from_parts(parts)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Extractor that requires a logged-in staff member.
///
/// Anonymous requests are redirected to the login page; logged-in
/// non-staff members get 403.
pub struct RequireStaff(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user_from_parts(parts)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        if !user.is_staff {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current member.
///
/// Unlike `RequireUser`, this does not reject the request when nobody is
/// logged in; used by public pages to vary the navigation.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user_from_parts(parts).await))
    }
}

/// Read the current user from the request's session, if any.
async fn current_user_from_parts(parts: &mut Parts) -> Option<CurrentUser> {
    // The session is placed in extensions by SessionManagerLayer.
    let session = parts.extensions.get::<Session>()?;
    session.get::<CurrentUser>(keys::CURRENT_USER).await.ok().flatten()
}
