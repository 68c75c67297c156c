//! Admin screens for toolkits.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use neurolab_core::ToolkitId;

use crate::db::{CatalogRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, resolve_slug};
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, Toolkit, ToolkitInput};
use crate::state::AppState;

use super::config::{self, Row};
use super::{AdminListTemplate, ConfirmDeleteTemplate, normalize_q};

/// Default display color, applied when the form field is left blank.
const DEFAULT_COLOR: &str = "#43e97b";

/// List screen query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
}

/// Toolkit create/edit form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolkitForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub modules: String,
}

impl ToolkitForm {
    fn from_entity(toolkit: &Toolkit) -> Self {
        Self {
            name: toolkit.name.clone(),
            slug: toolkit.slug.as_str().to_owned(),
            description: toolkit.description.clone(),
            github_url: toolkit.github_url.clone(),
            icon: toolkit.icon.clone(),
            color: toolkit.color.clone(),
            modules: toolkit.modules.clone(),
        }
    }

    fn validate(&self) -> std::result::Result<ToolkitInput, FormErrors> {
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

        Ok(ToolkitInput {
            name: self.name.clone(),
            slug,
            description: self.description.clone(),
            github_url: self.github_url.clone(),
            icon: self.icon.clone(),
            color: if self.color.is_empty() {
                DEFAULT_COLOR.to_owned()
            } else {
                self.color.clone()
            },
            modules: self.modules.clone(),
        })
    }
}

/// Toolkit form page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/toolkit_form.html")]
pub struct ToolkitFormTemplate {
    pub user: Option<CurrentUser>,
    pub form: ToolkitForm,
    pub errors: FormErrors,
    pub is_new: bool,
}

/// List toolkits with search.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<AdminListTemplate, AppError> {
    let toolkits = CatalogRepository::new(state.pool())
        .search_toolkits(normalize_q(&query.q))
        .await?;

    let rows = toolkits
        .into_iter()
        .map(|t| Row {
            id: t.id.as_i64(),
            cells: vec![t.name, t.slug.into_inner(), t.github_url],
        })
        .collect();

    Ok(AdminListTemplate {
        user: Some(admin),
        screen: &config::TOOLKITS,
        q: query.q,
        filters: Vec::new(),
        rows,
    })
}

/// Blank create form.
pub async fn new(RequireStaff(admin): RequireStaff) -> ToolkitFormTemplate {
    ToolkitFormTemplate {
        user: Some(admin),
        form: ToolkitForm::default(),
        errors: FormErrors::default(),
        is_new: true,
    }
}

/// Create a toolkit.
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Form(form): Form<ToolkitForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(ToolkitFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: true,
            }
            .into_response());
        }
    };

    match CatalogRepository::new(state.pool()).create_toolkit(&input).await {
        Ok(_) => Ok(Redirect::to(config::TOOLKITS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("slug", "Toolkit with this Slug already exists.");
            Ok(ToolkitFormTemplate {
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
) -> Result<ToolkitFormTemplate, AppError> {
    let toolkit = CatalogRepository::new(state.pool())
        .get_toolkit(ToolkitId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("toolkit {id}")))?;

    Ok(ToolkitFormTemplate {
        user: Some(admin),
        form: ToolkitForm::from_entity(&toolkit),
        errors: FormErrors::default(),
        is_new: false,
    })
}

/// Apply an edit.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
    Form(form): Form<ToolkitForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(ToolkitFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: false,
            }
            .into_response());
        }
    };

    match CatalogRepository::new(state.pool())
        .update_toolkit(ToolkitId::new(id), &input)
        .await
    {
        Ok(()) => Ok(Redirect::to(config::TOOLKITS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("slug", "Toolkit with this Slug already exists.");
            Ok(ToolkitFormTemplate {
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
    let toolkit = CatalogRepository::new(state.pool())
        .get_toolkit(ToolkitId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("toolkit {id}")))?;

    Ok(ConfirmDeleteTemplate {
        user: Some(admin),
        kind: config::TOOLKITS.singular,
        label: toolkit.name,
        cascade_note: "All of its studios and their workflows will be deleted as well."
            .to_owned(),
        cancel_url: config::TOOLKITS.url_base,
    })
}

/// Delete a toolkit and its sub-tree.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = CatalogRepository::new(state.pool())
        .delete_toolkit(ToolkitId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("toolkit {id}")));
    }

    Ok(Redirect::to(config::TOOLKITS.url_base).into_response())
}
