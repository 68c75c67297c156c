//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Render a markdown field to an HTML fragment.
///
/// The renderer escapes raw HTML, so the result is safe to mark `|safe`.
///
/// Usage in templates: `{{ toolkit.description|markdown|safe }}`
#[askama::filter_fn]
pub fn markdown(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(crate::markdown::render(&value.to_string()))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
