//! Dataset route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::{CurrentUser, Dataset};
use crate::state::AppState;

/// Dataset listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "datasets/list.html")]
pub struct DatasetListTemplate {
    pub user: Option<CurrentUser>,
    pub datasets: Vec<Dataset>,
}

/// Dataset detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "datasets/detail.html")]
pub struct DatasetDetailTemplate {
    pub user: Option<CurrentUser>,
    pub dataset: Dataset,
}

/// List all available datasets.
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Result<DatasetListTemplate> {
    let datasets = CatalogRepository::new(state.pool()).list_datasets().await?;

    Ok(DatasetListTemplate { user, datasets })
}

/// Show dataset details.
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(slug): Path<String>,
) -> Result<DatasetDetailTemplate> {
    let dataset = CatalogRepository::new(state.pool())
        .get_dataset_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {slug}")))?;

    Ok(DatasetDetailTemplate { user, dataset })
}
