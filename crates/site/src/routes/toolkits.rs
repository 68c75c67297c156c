//! Toolkit route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::{CurrentUser, ToolkitWithStudios};
use crate::state::AppState;

/// Toolkit listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "toolkits/list.html")]
pub struct ToolkitListTemplate {
    pub user: Option<CurrentUser>,
    pub toolkits: Vec<ToolkitWithStudios>,
}

/// Toolkit detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "toolkits/detail.html")]
pub struct ToolkitDetailTemplate {
    pub user: Option<CurrentUser>,
    pub entry: ToolkitWithStudios,
}

/// List all toolkits with their studios.
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<ToolkitListTemplate> {
    let toolkits = CatalogRepository::new(state.pool())
        .list_toolkits_with_studios()
        .await?;

    Ok(ToolkitListTemplate { user, toolkits })
}

/// Show toolkit details with its studios.
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(slug): Path<String>,
) -> Result<ToolkitDetailTemplate> {
    let entry = CatalogRepository::new(state.pool())
        .get_toolkit_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("toolkit {slug}")))?;

    Ok(ToolkitDetailTemplate { user, entry })
}
