//! Studio route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::{CurrentUser, StudioWithWorkflows};
use crate::state::AppState;

/// Studio listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "studios/list.html")]
pub struct StudioListTemplate {
    pub user: Option<CurrentUser>,
    pub studios: Vec<StudioWithWorkflows>,
}

/// Studio detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "studios/detail.html")]
pub struct StudioDetailTemplate {
    pub user: Option<CurrentUser>,
    pub entry: StudioWithWorkflows,
}

/// List all studios with their toolkit and workflows.
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<StudioListTemplate> {
    let studios = CatalogRepository::new(state.pool())
        .list_studios_with_workflows()
        .await?;

    Ok(StudioListTemplate { user, studios })
}

/// Show studio details with its workflows.
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(slug): Path<String>,
) -> Result<StudioDetailTemplate> {
    let entry = CatalogRepository::new(state.pool())
        .get_studio_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("studio {slug}")))?;

    Ok(StudioDetailTemplate { user, entry })
}
