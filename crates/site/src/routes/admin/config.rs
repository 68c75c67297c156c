//! Declarative admin screen configuration.
//!
//! Each entity type declares its list columns, search fields and filters
//! once; the generic list template renders from these definitions, so adding
//! a column is a data change, not a template change.

/// Column definition for an admin list screen.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Row cell key, in declaration order.
    pub key: &'static str,
    /// Display label for the column header.
    pub label: &'static str,
}

/// Static per-entity screen definition.
#[derive(Debug, Clone, Copy)]
pub struct ScreenConfig {
    /// Plural title, e.g. "Toolkits".
    pub title: &'static str,
    /// Singular label, e.g. "toolkit".
    pub singular: &'static str,
    /// URL prefix for the screen, e.g. "/admin/toolkits".
    pub url_base: &'static str,
    /// Display columns in order.
    pub columns: &'static [Column],
    /// Fields covered by the search box (shown as the placeholder).
    pub search_hint: &'static str,
}

/// A select-filter rendered above the list, with runtime options.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Query parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Available options.
    pub options: Vec<SelectOption>,
}

impl Filter {
    /// Create a filter with its options.
    #[must_use]
    pub fn new(key: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            options,
        }
    }
}

/// Option for filter and form `<select>` elements.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    /// Create a new option.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// One row of an admin list screen.
#[derive(Debug, Clone)]
pub struct Row {
    /// Entity ID, used to build edit/delete links.
    pub id: i64,
    /// Cell values in column order.
    pub cells: Vec<String>,
}

pub const USERS: ScreenConfig = ScreenConfig {
    title: "Lab users",
    singular: "user",
    url_base: "/admin/users",
    columns: &[
        Column { key: "username", label: "Username" },
        Column { key: "email", label: "Email" },
        Column { key: "uni_email", label: "University email" },
        Column { key: "supervisor", label: "Supervisor" },
        Column { key: "project_start_date", label: "Start date" },
        Column { key: "is_staff", label: "Staff" },
    ],
    search_hint: "Search username, email, university email, first or last name",
};

pub const TOOLKITS: ScreenConfig = ScreenConfig {
    title: "Toolkits",
    singular: "toolkit",
    url_base: "/admin/toolkits",
    columns: &[
        Column { key: "name", label: "Name" },
        Column { key: "slug", label: "Slug" },
        Column { key: "github_url", label: "GitHub URL" },
    ],
    search_hint: "Search name or description",
};

pub const STUDIOS: ScreenConfig = ScreenConfig {
    title: "Studios",
    singular: "studio",
    url_base: "/admin/studios",
    columns: &[
        Column { key: "name", label: "Name" },
        Column { key: "slug", label: "Slug" },
        Column { key: "toolkit", label: "Toolkit" },
        Column { key: "github_url", label: "GitHub URL" },
    ],
    search_hint: "Search name or description",
};

pub const WORKFLOWS: ScreenConfig = ScreenConfig {
    title: "Workflows",
    singular: "workflow",
    url_base: "/admin/workflows",
    columns: &[
        Column { key: "name", label: "Name" },
        Column { key: "slug", label: "Slug" },
        Column { key: "studio", label: "Studio" },
        Column { key: "branch_name", label: "Branch" },
    ],
    search_hint: "Search name or description",
};

pub const DATASETS: ScreenConfig = ScreenConfig {
    title: "Datasets",
    singular: "dataset",
    url_base: "/admin/datasets",
    columns: &[
        Column { key: "name", label: "Name" },
        Column { key: "slug", label: "Slug" },
        Column { key: "icon", label: "Icon" },
    ],
    search_hint: "Search name, description or use case",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_configs_match_declared_columns() {
        assert_eq!(USERS.columns.len(), 6);
        assert_eq!(TOOLKITS.columns.len(), 3);
        assert_eq!(STUDIOS.columns.len(), 4);
        assert_eq!(WORKFLOWS.columns.len(), 4);
        assert_eq!(DATASETS.columns.len(), 3);
    }

    #[test]
    fn test_url_bases_are_prefixed() {
        for screen in [&USERS, &TOOLKITS, &STUDIOS, &WORKFLOWS, &DATASETS] {
            assert!(screen.url_base.starts_with("/admin/"));
        }
    }
}
