//! Workflow route handlers.
//!
//! Workflow slugs are only unique within a studio, so the detail page is
//! addressed by the `(studio_slug, workflow_slug)` pair; a slug that exists
//! under a different studio is a miss.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::{CurrentUser, Studio, Toolkit, Workflow};
use crate::state::AppState;

/// Workflow detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "workflows/detail.html")]
pub struct WorkflowDetailTemplate {
    pub user: Option<CurrentUser>,
    pub workflow: Workflow,
    pub studio: Studio,
    pub toolkit: Toolkit,
}

/// Show workflow details.
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path((studio_slug, workflow_slug)): Path<(String, String)>,
) -> Result<WorkflowDetailTemplate> {
    let repo = CatalogRepository::new(state.pool());

    let entry = repo
        .get_studio_by_slug(&studio_slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("studio {studio_slug}")))?;

    let workflow = repo
        .get_workflow(entry.studio.id, &workflow_slug)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("workflow {studio_slug}/{workflow_slug}"))
        })?;

    Ok(WorkflowDetailTemplate {
        user,
        workflow,
        studio: entry.studio,
        toolkit: entry.toolkit,
    })
}
