//! Administrative console.
//!
//! Generic per-entity record management over the entity store: list screens
//! with declared columns/search/filters, create and edit forms, and
//! confirm-then-delete. Every route requires a logged-in staff member.

pub mod config;
pub mod datasets;
pub mod studios;
pub mod toolkits;
pub mod users;
pub mod workflows;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    routing::get,
};

use crate::db::catalog::CatalogCounts;
use crate::db::users::UserRepository;
use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::models::CurrentUser;
use crate::state::AppState;

use config::{Filter, Row, ScreenConfig};

/// Shared list screen template, rendered from a [`ScreenConfig`].
#[derive(Template, WebTemplate)]
#[template(path = "admin/list.html")]
pub struct AdminListTemplate {
    pub user: Option<CurrentUser>,
    pub screen: &'static ScreenConfig,
    pub q: String,
    pub filters: Vec<Filter>,
    pub rows: Vec<Row>,
}

/// Shared delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub user: Option<CurrentUser>,
    /// Singular entity label, e.g. "toolkit".
    pub kind: &'static str,
    /// Display label of the record about to be deleted.
    pub label: String,
    /// Extra warning about cascading children, if any.
    pub cascade_note: String,
    pub cancel_url: &'static str,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
    pub user: Option<CurrentUser>,
    pub counts: CatalogCounts,
    pub user_count: i64,
}

/// Admin dashboard: entity types and record counts.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
) -> Result<AdminIndexTemplate> {
    let counts = CatalogRepository::new(state.pool()).counts().await?;
    let user_count = UserRepository::new(state.pool()).count().await?;

    Ok(AdminIndexTemplate {
        user: Some(admin),
        counts,
        user_count,
    })
}

/// Create the admin console router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        // Lab users
        .route("/users", get(users::index))
        .route("/users/new", get(users::new).post(users::create))
        .route("/users/{id}/edit", get(users::edit).post(users::update))
        .route(
            "/users/{id}/delete",
            get(users::confirm_delete).post(users::delete),
        )
        // Toolkits
        .route("/toolkits", get(toolkits::index))
        .route("/toolkits/new", get(toolkits::new).post(toolkits::create))
        .route(
            "/toolkits/{id}/edit",
            get(toolkits::edit).post(toolkits::update),
        )
        .route(
            "/toolkits/{id}/delete",
            get(toolkits::confirm_delete).post(toolkits::delete),
        )
        // Studios
        .route("/studios", get(studios::index))
        .route("/studios/new", get(studios::new).post(studios::create))
        .route(
            "/studios/{id}/edit",
            get(studios::edit).post(studios::update),
        )
        .route(
            "/studios/{id}/delete",
            get(studios::confirm_delete).post(studios::delete),
        )
        // Workflows
        .route("/workflows", get(workflows::index))
        .route("/workflows/new", get(workflows::new).post(workflows::create))
        .route(
            "/workflows/{id}/edit",
            get(workflows::edit).post(workflows::update),
        )
        .route(
            "/workflows/{id}/delete",
            get(workflows::confirm_delete).post(workflows::delete),
        )
        // Datasets
        .route("/datasets", get(datasets::index))
        .route("/datasets/new", get(datasets::new).post(datasets::create))
        .route(
            "/datasets/{id}/edit",
            get(datasets::edit).post(datasets::update),
        )
        .route(
            "/datasets/{id}/delete",
            get(datasets::confirm_delete).post(datasets::delete),
        )
}

/// Parse an optional numeric filter value ("" or garbage means no filter).
pub(crate) fn parse_id_filter(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok()
}

/// Normalize a search box value: empty string means no search.
pub(crate) fn normalize_q(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
