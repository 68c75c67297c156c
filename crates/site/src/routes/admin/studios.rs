//! Admin screens for studios.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use neurolab_core::{StudioId, ToolkitId};

use crate::db::{CatalogRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, resolve_slug};
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, Studio, StudioInput};
use crate::state::AppState;

use super::config::{self, Filter, Row, SelectOption};
use super::{AdminListTemplate, ConfirmDeleteTemplate, normalize_q, parse_id_filter};

/// List screen query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    /// Toolkit filter (entity ID as string, empty for all).
    #[serde(default)]
    pub toolkit: String,
}

/// Studio create/edit form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudioForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Selected toolkit ID as string.
    #[serde(default)]
    pub toolkit: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub icon: String,
}

impl StudioForm {
    fn from_entity(studio: &Studio) -> Self {
        Self {
            name: studio.name.clone(),
            slug: studio.slug.as_str().to_owned(),
            description: studio.description.clone(),
            toolkit: studio.toolkit_id.as_i64().to_string(),
            github_url: studio.github_url.clone(),
            icon: studio.icon.clone(),
        }
    }

    fn validate(&self) -> std::result::Result<StudioInput, FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.is_empty() {
            errors.add("name", "This field is required.");
        }
        let slug = resolve_slug(&self.slug, &self.name, &mut errors);
        let toolkit_id = match self.toolkit.parse::<i64>() {
            Ok(id) => Some(ToolkitId::new(id)),
            Err(_) => {
                errors.add("toolkit", "This field is required.");
                None
            }
        };

        let (Some(slug), Some(toolkit_id)) = (slug, toolkit_id) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(StudioInput {
            name: self.name.clone(),
            slug,
            description: self.description.clone(),
            toolkit_id,
            github_url: self.github_url.clone(),
            icon: self.icon.clone(),
        })
    }
}

/// Studio form page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/studio_form.html")]
pub struct StudioFormTemplate {
    pub user: Option<CurrentUser>,
    pub form: StudioForm,
    pub errors: FormErrors,
    pub is_new: bool,
    /// Toolkit choices for the select element.
    pub toolkits: Vec<SelectOption>,
}

/// Build the toolkit `<select>` options, marking the current choice.
async fn toolkit_options(
    repo: &CatalogRepository<'_>,
    selected: &str,
) -> Result<Vec<SelectOption>, AppError> {
    let toolkits = repo.list_toolkits().await?;
    Ok(toolkits
        .into_iter()
        .map(|t| {
            let value = t.id.as_i64().to_string();
            let is_selected = value == selected;
            SelectOption::new(value, t.name, is_selected)
        })
        .collect())
}

/// Re-render the form page with validation errors.
async fn render_form(
    repo: &CatalogRepository<'_>,
    admin: CurrentUser,
    form: StudioForm,
    errors: FormErrors,
    is_new: bool,
) -> Result<Response, AppError> {
    Ok(StudioFormTemplate {
        user: Some(admin),
        toolkits: toolkit_options(repo, &form.toolkit).await?,
        form,
        errors,
        is_new,
    }
    .into_response())
}

/// List studios with search and toolkit filter.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<AdminListTemplate, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let toolkit_filter = parse_id_filter(&query.toolkit).map(ToolkitId::new);
    let studios = repo
        .search_studios(normalize_q(&query.q), toolkit_filter)
        .await?;

    let toolkits = repo.list_toolkits().await?;
    let toolkit_names: HashMap<ToolkitId, String> =
        toolkits.iter().map(|t| (t.id, t.name.clone())).collect();

    let filters = vec![Filter::new(
        "toolkit",
        "toolkit",
        toolkits
            .iter()
            .map(|t| {
                SelectOption::new(
                    t.id.as_i64().to_string(),
                    t.name.clone(),
                    Some(t.id) == toolkit_filter,
                )
            })
            .collect(),
    )];

    let rows = studios
        .into_iter()
        .map(|s| Row {
            id: s.id.as_i64(),
            cells: vec![
                s.name,
                s.slug.into_inner(),
                toolkit_names.get(&s.toolkit_id).cloned().unwrap_or_default(),
                s.github_url,
            ],
        })
        .collect();

    Ok(AdminListTemplate {
        user: Some(admin),
        screen: &config::STUDIOS,
        q: query.q,
        filters,
        rows,
    })
}

/// Blank create form.
pub async fn new(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
) -> Result<StudioFormTemplate, AppError> {
    let repo = CatalogRepository::new(state.pool());

    Ok(StudioFormTemplate {
        user: Some(admin),
        toolkits: toolkit_options(&repo, "").await?,
        form: StudioForm::default(),
        errors: FormErrors::default(),
        is_new: true,
    })
}

/// Create a studio.
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Form(form): Form<StudioForm>,
) -> Result<Response, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&repo, admin, form, errors, true).await,
    };

    match repo.create_studio(&input).await {
        Ok(_) => Ok(Redirect::to(config::STUDIOS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("slug", "Studio with this Slug already exists.");
            render_form(&repo, admin, form, errors, true).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit form, prefilled.
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<StudioFormTemplate, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let studio = repo
        .get_studio(StudioId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("studio {id}")))?;

    let form = StudioForm::from_entity(&studio);
    Ok(StudioFormTemplate {
        user: Some(admin),
        toolkits: toolkit_options(&repo, &form.toolkit).await?,
        form,
        errors: FormErrors::default(),
        is_new: false,
    })
}

/// Apply an edit.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
    Form(form): Form<StudioForm>,
) -> Result<Response, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&repo, admin, form, errors, false).await,
    };

    match repo.update_studio(StudioId::new(id), &input).await {
        Ok(()) => Ok(Redirect::to(config::STUDIOS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("slug", "Studio with this Slug already exists.");
            render_form(&repo, admin, form, errors, false).await
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
    let studio = CatalogRepository::new(state.pool())
        .get_studio(StudioId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("studio {id}")))?;

    Ok(ConfirmDeleteTemplate {
        user: Some(admin),
        kind: config::STUDIOS.singular,
        label: studio.name,
        cascade_note: "All of its workflows will be deleted as well.".to_owned(),
        cancel_url: config::STUDIOS.url_base,
    })
}

/// Delete a studio and its workflows.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = CatalogRepository::new(state.pool())
        .delete_studio(StudioId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("studio {id}")));
    }

    Ok(Redirect::to(config::STUDIOS.url_base).into_response())
}
