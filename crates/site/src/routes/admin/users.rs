//! Admin screens for lab users.
//!
//! The user form carries the full admin-editable field set including the
//! staff/active flags; the password pair is required on create and optional
//! on edit (blank means "leave unchanged").

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use neurolab_core::UserId;

use crate::db::users::{UserListFilter, UserRepository};
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::filters;
use crate::forms::{
    FormErrors, parse_optional_date, validate_optional_email, validate_password_pair,
    validate_username,
};
use crate::middleware::RequireStaff;
use crate::models::user::{LabUser, LabUserUpdate, NewLabUser};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

use super::config::{self, Filter, Row, SelectOption};
use super::{AdminListTemplate, ConfirmDeleteTemplate, normalize_q};

/// List screen query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    /// Staff flag filter: "1", "0" or empty.
    #[serde(default)]
    pub staff: String,
    /// Active flag filter: "1", "0" or empty.
    #[serde(default)]
    pub active: String,
    /// Exact supervisor name, empty for all.
    #[serde(default)]
    pub supervisor: String,
}

/// Parse a "1"/"0" flag filter value.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Yes/No options for a flag filter.
fn flag_options(selected: Option<bool>) -> Vec<SelectOption> {
    vec![
        SelectOption::new("1", "Yes", selected == Some(true)),
        SelectOption::new("0", "No", selected == Some(false)),
    ]
}

/// User create/edit form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub uni_email: String,
    #[serde(default)]
    pub github_username: String,
    #[serde(default)]
    pub basecamp_id: String,
    #[serde(default)]
    pub supervisor: String,
    #[serde(default)]
    pub project_start_date: String,
    /// Checkbox: present when checked.
    #[serde(default)]
    pub is_staff: Option<String>,
    /// Checkbox: present when checked.
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl UserForm {
    fn from_entity(user: &LabUser) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            uni_email: user.uni_email.clone(),
            github_username: user.github_username.clone(),
            basecamp_id: user.basecamp_id.clone(),
            supervisor: user.supervisor.clone(),
            project_start_date: user
                .project_start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            is_staff: user.is_staff.then(|| "on".to_owned()),
            is_active: user.is_active.then(|| "on".to_owned()),
            password1: String::new(),
            password2: String::new(),
        }
    }

    /// Validate the form.
    ///
    /// On create the password pair is required; on edit it is optional and
    /// a blank pair means "keep the current password".
    fn validate(
        &self,
        is_new: bool,
    ) -> std::result::Result<(LabUserUpdate, Option<String>), FormErrors> {
        let mut errors = FormErrors::default();

        validate_username(&self.username, &mut errors);
        validate_optional_email("email", &self.email, &mut errors);
        validate_optional_email("uni_email", &self.uni_email, &mut errors);
        let project_start_date =
            parse_optional_date("project_start_date", &self.project_start_date, &mut errors);

        let wants_password = is_new || !self.password1.is_empty() || !self.password2.is_empty();
        if wants_password {
            validate_password_pair(
                "password1",
                &self.password1,
                "password2",
                &self.password2,
                &mut errors,
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok((
            LabUserUpdate {
                username: self.username.clone(),
                email: self.email.clone(),
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                uni_email: self.uni_email.clone(),
                github_username: self.github_username.clone(),
                basecamp_id: self.basecamp_id.clone(),
                supervisor: self.supervisor.clone(),
                project_start_date,
                is_staff: self.is_staff.is_some(),
                is_active: self.is_active.is_some(),
            },
            wants_password.then(|| self.password1.clone()),
        ))
    }
}

/// User form page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/user_form.html")]
pub struct UserFormTemplate {
    pub user: Option<CurrentUser>,
    pub form: UserForm,
    pub errors: FormErrors,
    pub is_new: bool,
}

/// List users with search and staff/active/supervisor filters.
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<AdminListTemplate, AppError> {
    let repo = UserRepository::new(state.pool());

    let staff = parse_flag(&query.staff);
    let active = parse_flag(&query.active);
    let supervisor = if query.supervisor.is_empty() {
        None
    } else {
        Some(query.supervisor.clone())
    };

    let filter = UserListFilter {
        q: normalize_q(&query.q).map(str::to_owned),
        staff,
        active,
        supervisor: supervisor.clone(),
    };
    let users = repo.list(&filter).await?;

    let filters = vec![
        Filter::new("staff", "staff status", flag_options(staff)),
        Filter::new("active", "active", flag_options(active)),
        Filter::new(
            "supervisor",
            "supervisor",
            repo.list_supervisors()
                .await?
                .into_iter()
                .map(|name| {
                    let selected = supervisor.as_deref() == Some(name.as_str());
                    SelectOption::new(name.clone(), name, selected)
                })
                .collect(),
        ),
    ];

    let rows = users
        .into_iter()
        .map(|u| Row {
            id: u.id.as_i64(),
            cells: vec![
                u.username,
                u.email,
                u.uni_email,
                u.supervisor,
                u.project_start_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                if u.is_staff { "yes" } else { "no" }.to_owned(),
            ],
        })
        .collect();

    Ok(AdminListTemplate {
        user: Some(admin),
        screen: &config::USERS,
        q: query.q,
        filters,
        rows,
    })
}

/// Blank create form (active by default).
pub async fn new(RequireStaff(admin): RequireStaff) -> UserFormTemplate {
    UserFormTemplate {
        user: Some(admin),
        form: UserForm {
            is_active: Some("on".to_owned()),
            ..UserForm::default()
        },
        errors: FormErrors::default(),
        is_new: true,
    }
}

/// Create a user.
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let (update, password) = match form.validate(true) {
        Ok(parsed) => parsed,
        Err(errors) => {
            return Ok(UserFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: true,
            }
            .into_response());
        }
    };

    let new_user = NewLabUser {
        username: update.username.clone(),
        email: update.email.clone(),
        first_name: update.first_name.clone(),
        last_name: update.last_name.clone(),
        uni_email: update.uni_email.clone(),
        github_username: update.github_username.clone(),
        basecamp_id: update.basecamp_id.clone(),
        supervisor: update.supervisor.clone(),
        project_start_date: update.project_start_date,
        is_staff: update.is_staff,
    };
    let password = password.unwrap_or_default();

    let repo = UserRepository::new(state.pool());
    let created = match AuthService::new(state.pool())
        .register(&new_user, &password)
        .await
    {
        Ok(user) => user,
        Err(crate::services::auth::AuthError::UsernameTaken) => {
            let mut errors = FormErrors::default();
            errors.add("username", "A user with that username already exists.");
            return Ok(UserFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: true,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // Accounts are created active; apply the full flag set if it differs.
    if !update.is_active {
        repo.update(created.id, &update).await?;
    }

    Ok(Redirect::to(config::USERS.url_base).into_response())
}

/// Edit form, prefilled.
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<UserFormTemplate, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    Ok(UserFormTemplate {
        user: Some(admin),
        form: UserForm::from_entity(&user),
        errors: FormErrors::default(),
        is_new: false,
    })
}

/// Apply an edit; sets a new password when one was entered.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let user_id = UserId::new(id);
    let repo = UserRepository::new(state.pool());

    // 404 before validation, like every other edit screen.
    repo.get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    let (update, password) = match form.validate(false) {
        Ok(parsed) => parsed,
        Err(errors) => {
            return Ok(UserFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: false,
            }
            .into_response());
        }
    };

    match repo.update(user_id, &update).await {
        Ok(()) => {}
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::default();
            errors.add("username", "A user with that username already exists.");
            return Ok(UserFormTemplate {
                user: Some(admin),
                form,
                errors,
                is_new: false,
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(password) = password {
        AuthService::new(state.pool())
            .set_password(user_id, &password)
            .await?;
    }

    Ok(Redirect::to(config::USERS.url_base).into_response())
}

/// Confirm deletion.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireStaff(admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<ConfirmDeleteTemplate, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    Ok(ConfirmDeleteTemplate {
        user: Some(admin),
        kind: config::USERS.singular,
        label: user.display_label(),
        cascade_note: String::new(),
        cancel_url: config::USERS.url_base,
    })
}

/// Delete a user.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_admin): RequireStaff,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deleted = UserRepository::new(state.pool())
        .delete(UserId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("user {id}")));
    }

    Ok(Redirect::to(config::USERS.url_base).into_response())
}
