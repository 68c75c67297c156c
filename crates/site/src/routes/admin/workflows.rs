//! Admin screens for workflows.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use neurolab_core::{StudioId, ToolkitId, WorkflowId};

use crate::db::{CatalogRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, resolve_slug};
use crate::middleware::RequireStaff;
use crate::models::{CurrentUser, Workflow, WorkflowInput};
use crate::state::AppState;

use super::config::{self, Filter, Row, SelectOption};
use super::{AdminListTemplate, ConfirmDeleteTemplate, normalize_q, parse_id_filter};

/// List screen query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    /// Studio filter (entity ID as string, empty for all).
    #[serde(default)]
    pub studio: String,
    /// Filter by the studio's owning toolkit.
    #[serde(default)]
    pub toolkit: String,
}

/// Workflow create/edit form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Selected studio ID as string.
    #[serde(default)]
    pub studio: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub datasets: String,
}

impl WorkflowForm {
    fn from_entity(workflow: &Workflow) -> Self {
        Self {
            name: workflow.name.clone(),
            slug: workflow.slug.as_str().to_owned(),
            description: workflow.description.clone(),
            studio: workflow.studio_id.as_i64().to_string(),
            branch_name: workflow.branch_name.clone(),
            datasets: workflow.datasets.clone(),
        }
    }

    fn validate(&self) -> std::result::Result<WorkflowInput, FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.is_empty() {
            errors.add("name", "This field is required.");
        }
        let slug = resolve_slug(&self.slug, &self.name, &mut errors);
        let studio_id = match self.studio.parse::<i64>() {
            Ok(id) => Some(StudioId::new(id)),
            Err(_) => {
                errors.add("studio", "This field is required.");
                None
            }
        };

        let (Some(slug), Some(studio_id)) = (slug, studio_id) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(WorkflowInput {
            name: self.name.clone(),
            slug,
            description: self.description.clone(),
            studio_id,
            branch_name: self.branch_name.clone(),
            datasets: self.datasets.clone(),
        })
    }
}

/// Workflow form page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/workflow_form.html")]
pub struct WorkflowFormTemplate {
    pub user: Option<CurrentUser>,
    pub form: WorkflowForm,
    pub errors: FormErrors,
    pub is_new: bool,
    /// Studio choices for the select element.
    pub studios: Vec<SelectOption>,
}

/// Build the studio `<select>` options, marking the current choice.
async fn studio_options(
    repo: &CatalogRepository<'_>,
    selected: &str,
) -> Result<Vec<SelectOption>, AppError> {
    let studios = repo.list_studios().await?;
    Ok(studios
        .into_iter()
        .map(|s| {
            let value = s.id.as_i64().to_string();
            let is_selected = value == selected;
            SelectOption::new(value, s.name, is_selected)
        })
        .collect())
}

/// Re-render the form page with validation errors.
async fn render_form(
    repo: &CatalogRepository<'_>,
    admin: CurrentUser,
    form: WorkflowForm,
    errors: FormErrors,
    is_new: bool,
) -> Result<Response, AppError> {
    Ok(WorkflowFormTemplate {
        user: Some(admin),
        studios: studio_options(repo, &form.studio).await?,
        form,
        errors,
        is_new,
    }
    .into_response())
}

/// List workflows with search, studio filter and toolkit filter.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<AdminListTemplate, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let studio_filter = parse_id_filter(&query.studio).map(StudioId::new);
    let toolkit_filter = parse_id_filter(&query.toolkit).map(ToolkitId::new);

    let workflows = repo
        .search_workflows(normalize_q(&query.q), studio_filter, toolkit_filter)
        .await?;

    let studios = repo.list_studios().await?;
    let toolkits = repo.list_toolkits().await?;
    let studio_names: HashMap<StudioId, String> =
        studios.iter().map(|s| (s.id, s.name.clone())).collect();

    let filters = vec![
        Filter::new(
            "studio",
            "studio",
            studios
                .iter()
                .map(|s| {
                    SelectOption::new(
                        s.id.as_i64().to_string(),
                        s.name.clone(),
                        Some(s.id) == studio_filter,
                    )
                })
                .collect(),
        ),
        Filter::new(
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
        ),
    ];

    let rows = workflows
        .into_iter()
        .map(|w| Row {
            id: w.id.as_i64(),
            cells: vec![
                w.name,
                w.slug.into_inner(),
                studio_names.get(&w.studio_id).cloned().unwrap_or_default(),
                w.branch_name,
            ],
        })
        .collect();

    Ok(AdminListTemplate {
        user: Some(admin),
        screen: &config::WORKFLOWS,
        q: query.q,
        filters,
        rows,
    })
}

/// Blank create form.
pub async fn new(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
) -> Result<WorkflowFormTemplate, AppError> {
    let repo = CatalogRepository::new(state.pool());

    Ok(WorkflowFormTemplate {
        user: Some(admin),
        studios: studio_options(&repo, "").await?,
        form: WorkflowForm::default(),
        errors: FormErrors::default(),
        is_new: true,
    })
}

/// Create a workflow.
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Form(form): Form<WorkflowForm>,
) -> Result<Response, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&repo, admin, form, errors, true).await,
    };

    match repo.create_workflow(&input).await {
        Ok(_) => Ok(Redirect::to(config::WORKFLOWS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add(
                "slug",
                "Workflow with this Studio and Slug already exists.",
            );
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
) -> Result<WorkflowFormTemplate, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let workflow = repo
        .get_workflow_by_id(WorkflowId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("workflow {id}")))?;

    let form = WorkflowForm::from_entity(&workflow);
    Ok(WorkflowFormTemplate {
        user: Some(admin),
        studios: studio_options(&repo, &form.studio).await?,
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
    Form(form): Form<WorkflowForm>,
) -> Result<Response, AppError> {
    let repo = CatalogRepository::new(state.pool());

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_form(&repo, admin, form, errors, false).await,
    };

    match repo.update_workflow(WorkflowId::new(id), &input).await {
        Ok(()) => Ok(Redirect::to(config::WORKFLOWS.url_base).into_response()),
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add(
                "slug",
                "Workflow with this Studio and Slug already exists.",
            );
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
    let workflow = CatalogRepository::new(state.pool())
        .get_workflow_by_id(WorkflowId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("workflow {id}")))?;

    Ok(ConfirmDeleteTemplate {
        user: Some(admin),
        kind: config::WORKFLOWS.singular,
        label: workflow.name,
        cascade_note: String::new(),
        cancel_url: config::WORKFLOWS.url_base,
    })
}

/// Delete a workflow.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = CatalogRepository::new(state.pool())
        .delete_workflow(WorkflowId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("workflow {id}")));
    }

    Ok(Redirect::to(config::WORKFLOWS.url_base).into_response())
}
