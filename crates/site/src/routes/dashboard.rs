//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::{CurrentUser, ToolkitWithStudios};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: Option<CurrentUser>,
    pub toolkits: Vec<ToolkitWithStudios>,
}

/// Main dashboard showing all toolkits with their studios.
pub async fn dashboard(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<DashboardTemplate> {
    let toolkits = CatalogRepository::new(state.pool())
        .list_toolkits_with_studios()
        .await?;

    Ok(DashboardTemplate { user, toolkits })
}
