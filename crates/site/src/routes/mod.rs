//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Dashboard (toolkits with nested studios)
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /toolkits                - Toolkit listing
//! GET  /toolkit/{slug}          - Toolkit detail
//! GET  /studios                 - Studio listing
//! GET  /studio/{slug}           - Studio detail
//! GET  /studio/{slug}/workflow/{slug} - Workflow detail
//! GET  /datasets                - Dataset listing
//! GET  /dataset/{slug}          - Dataset detail
//!
//! # Registration
//! GET  /register                - Registration page
//! POST /register                - Create account + session
//!
//! # Accounts
//! GET  /accounts/login          - Login page
//! POST /accounts/login          - Login action
//! POST /accounts/logout         - Logout action
//! GET  /accounts/password-change - Password change page (requires auth)
//! POST /accounts/password-change - Password change action
//! GET  /accounts/profile        - Own profile page (requires auth)
//! POST /accounts/profile        - Update own profile
//!
//! # Admin console (requires staff)
//! GET  /admin                   - Entity overview
//! GET  /admin/{entity}          - List with search/filters
//! GET/POST /admin/{entity}/new  - Create
//! GET/POST /admin/{entity}/{id}/edit   - Edit
//! GET/POST /admin/{entity}/{id}/delete - Confirm + delete
//! ```

pub mod accounts;
pub mod admin;
pub mod dashboard;
pub mod datasets;
pub mod register;
pub mod studios;
pub mod toolkits;
pub mod workflows;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/toolkits", get(toolkits::index))
        .route("/toolkit/{slug}", get(toolkits::show))
        .route("/studios", get(studios::index))
        .route("/studio/{slug}", get(studios::show))
        .route(
            "/studio/{studio_slug}/workflow/{workflow_slug}",
            get(workflows::show),
        )
        .route("/datasets", get(datasets::index))
        .route("/dataset/{slug}", get(datasets::show))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(accounts::login_page).post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route(
            "/password-change",
            get(accounts::password_change_page).post(accounts::password_change),
        )
        .route(
            "/profile",
            get(accounts::profile_page).post(accounts::profile_update),
        )
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::dashboard))
        // Catalog
        .merge(catalog_routes())
        // Registration
        .route(
            "/register",
            get(register::register_page).post(register::register),
        )
        // Accounts
        .nest("/accounts", account_routes())
        // Admin console
        .nest("/admin", admin::admin_routes())
}
