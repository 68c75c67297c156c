//! End-to-end tests for the NeuroLab site.
//!
//! Tests drive the fully assembled router (sessions included) through
//! `tower::ServiceExt::oneshot` against per-test `SQLite` databases; no
//! server process is started.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p neurolab-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)] // test-support crate

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

use neurolab_site::app;
use neurolab_site::config::SiteConfig;
use neurolab_site::models::user::NewLabUser;
use neurolab_site::services::auth::AuthService;
use neurolab_site::state::AppState;

/// Configuration for tests; never read from the environment.
#[must_use]
pub fn test_config() -> SiteConfig {
    SiteConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:8000".to_owned(),
        session_secret: SecretString::from("kY8rT2mQ9xW4nB7cJ1dF5gH0sL3pV6zA".to_owned()),
        sentry_dsn: None,
    }
}

/// Build the full application router over the given pool.
pub async fn test_app(pool: SqlitePool) -> Router {
    let state = AppState::new(test_config(), pool);
    app::build(state).await.expect("session store init")
}

/// Issue a GET request.
pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Issue a GET request with a session cookie.
pub async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Issue a form POST (urlencoded body), optionally with a session cookie.
pub async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::from(body.to_owned())).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("request failed")
}

/// Collect a response body into a string.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract the session cookie pair from a response, if one was set.
#[must_use]
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(';').next())
        .map(str::to_owned)
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Create an account directly (bypassing the form) and return its username.
pub async fn create_account(pool: &SqlitePool, username: &str, password: &str, is_staff: bool) {
    let new_user = NewLabUser {
        username: username.to_owned(),
        is_staff,
        ..NewLabUser::default()
    };
    AuthService::new(pool)
        .register(&new_user, password)
        .await
        .expect("account creation");
}

/// Log in through the login form and return the session cookie.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let body = format!("username={username}&password={password}");
    let response = post_form(app, "/accounts/login", &body, None).await;
    assert!(
        response.status().is_redirection(),
        "login failed with status {}",
        response.status()
    );
    session_cookie(&response).expect("login should set a session cookie")
}
