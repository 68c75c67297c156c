//! Admin screens for datasets.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use neurolab_core::DatasetId;

use crate::db::{CatalogRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, resolve_slug};
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, Dataset, DatasetInput};
use crate::state::AppState;

use super::config::{self, Row};
use super::{AdminListTemplate, ConfirmDeleteTemplate, normalize_q};

/// List screen query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
}

/// Dataset create/edit form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub features: String,
}

impl DatasetForm {
    fn from_entity(dataset: &Dataset) -> Self {
        Self {
            name: dataset.name.clone(),
            slug: dataset.slug.as_str().to_owned(),
            description: dataset.description.clone(),
            icon: dataset.icon.clone(),
            use_case: dataset.use_case.clone(),
            features: dataset.features.clone(),
        }
    }

    fn validate(&self) -> std::result::Result<DatasetInput, FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.is_empty() {
            errors.add("name", "This field is required.");
        }
        let slug = resolve_slug(&self.slug, &self.name, &mut errors);

        let Some(slug) = slug else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DatasetInput {
            name: self.name.clone(),
            slug,
            description: self.description.clone(),
            icon: self.icon.clone(),
            use_case: self.use_case.clone(),
            features: self.features.clone(),
        })
    }
}

/// Dataset form page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dataset_form.html")]
pub struct DatasetFormTemplate {
    pub user: Option<CurrentUser>,
    pub form: DatasetForm,
    pub errors: FormErrors,
    pub is_new: bool,
}

/// List datasets with search.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<AdminListTemplate, AppError> {
    let datasets = CatalogRepository::new(state.pool())
        .search_datasets(normalize_q(&query.q))
        .await?;

    let rows = datasets
        .into_iter()
        .map(|d| Row {
            id: d.id.as_i64(),
            cells: vec![d.name, d.slug.into_inner(), d.icon],
        })
        .collect();

    Ok(AdminListTemplate {
        user: Some(admin),
        screen: &config::DATASETS,
        q: query.q,
        filters: Vec::new(),
        rows,
    })
}

/// Blank create form.
pub async fn new(RequireStaff(admin): RequireStaff) -> DatasetFormTemplate {
    DatasetFormTemplate {
        user: Some(admin),
        form: DatasetForm::default(),
        errors: FormErrors::default(),
        is_new: true,
    }
}

/// Create a dataset.
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Form(form): Form<DatasetForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(DatasetFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: true,
            }
            .into_response());
        }
    };

    match CatalogRepository::new(state.pool()).create_dataset(&input).await {
        Ok(_) => Ok(Redirect::to(config::DATASETS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("slug", "Dataset with this Slug already exists.");
            Ok(DatasetFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: true,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit form, prefilled.
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<DatasetFormTemplate, AppError> {
    let dataset = CatalogRepository::new(state.pool())
        .get_dataset(DatasetId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {id}")))?;

    Ok(DatasetFormTemplate {
        user: Some(admin),
        form: DatasetForm::from_entity(&dataset),
        errors: FormErrors::default(),
        is_new: false,
    })
}

/// Apply an edit.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
    Form(form): Form<DatasetForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(DatasetFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: false,
            }
            .into_response());
        }
    };

    match CatalogRepository::new(state.pool())
        .update_dataset(DatasetId::new(id), &input)
        .await
    {
        Ok(()) => Ok(Redirect::to(config::DATASETS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("slug", "Dataset with this Slug already exists.");
            Ok(DatasetFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: false,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Confirm deletion.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<ConfirmDeleteTemplate, AppError> {
    let dataset = CatalogRepository::new(state.pool())
        .get_dataset(DatasetId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dataset {id}")))?;

    Ok(ConfirmDeleteTemplate {
        user: Some(admin),
        kind: config::DATASETS.singular,
        label: dataset.name,
        cascade_note: String::new(),
        cancel_url: config::DATASETS.url_base,
    })
}

/// Delete a dataset.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = CatalogRepository::new(state.pool())
        .delete_dataset(DatasetId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("dataset {id}")));
    }

    Ok(Redirect::to(config::DATASETS.url_base).into_response())
}
