//! Catalog domain types: toolkits, studios, workflows and datasets.
//!
//! Toolkits own studios, studios own workflows; datasets stand alone.
//! Newline-delimited text fields (`modules`, `datasets`, `features`) expose
//! list helpers that trim lines and drop blanks.

use neurolab_core::{DatasetId, Slug, StudioId, ToolkitId, WorkflowId};

/// Split a newline-delimited text field into trimmed, non-empty lines.
fn lines_list(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// A foundational library entry; the root of the catalog hierarchy.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Toolkit {
    pub id: ToolkitId,
    pub name: String,
    /// Globally unique URL identifier.
    pub slug: Slug,
    /// Markdown description.
    pub description: String,
    pub github_url: String,
    /// Display emoji.
    pub icon: String,
    /// Display color (hex).
    pub color: String,
    /// Key modules, one per line.
    pub modules: String,
}

impl Toolkit {
    /// Key modules as a list.
    #[must_use]
    pub fn modules_list(&self) -> Vec<&str> {
        lines_list(&self.modules)
    }
}

/// A workflow-implementation grouping under a toolkit.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Studio {
    pub id: StudioId,
    pub name: String,
    /// Globally unique URL identifier.
    pub slug: Slug,
    pub description: String,
    /// Owning toolkit; deleting the toolkit deletes this studio.
    pub toolkit_id: ToolkitId,
    pub github_url: String,
    pub icon: String,
}

/// A specific task or experiment under a studio.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    /// Unique within the owning studio only.
    pub slug: Slug,
    pub description: String,
    /// Owning studio; deleting the studio deletes this workflow.
    pub studio_id: StudioId,
    /// Git branch name (may be empty).
    pub branch_name: String,
    /// Datasets used, one per line.
    pub datasets: String,
}

impl Workflow {
    /// Datasets used, as a list.
    #[must_use]
    pub fn datasets_list(&self) -> Vec<&str> {
        lines_list(&self.datasets)
    }
}

/// A dataset catalog entry, independent of the toolkit hierarchy.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    /// Globally unique URL identifier.
    pub slug: Slug,
    pub description: String,
    pub icon: String,
    /// Free-text use case description.
    pub use_case: String,
    /// Features, one per line.
    pub features: String,
}

impl Dataset {
    /// Features as a list.
    #[must_use]
    pub fn features_list(&self) -> Vec<&str> {
        lines_list(&self.features)
    }
}

/// A toolkit with its studios eagerly loaded (list and detail views).
#[derive(Debug, Clone)]
pub struct ToolkitWithStudios {
    pub toolkit: Toolkit,
    pub studios: Vec<Studio>,
}

/// A studio with its owning toolkit and workflows eagerly loaded.
#[derive(Debug, Clone)]
pub struct StudioWithWorkflows {
    pub studio: Studio,
    pub toolkit: Toolkit,
    pub workflows: Vec<Workflow>,
}

/// Fields accepted when creating or editing a toolkit.
#[derive(Debug, Clone)]
pub struct ToolkitInput {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub github_url: String,
    pub icon: String,
    pub color: String,
    pub modules: String,
}

/// Fields accepted when creating or editing a studio.
#[derive(Debug, Clone)]
pub struct StudioInput {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub toolkit_id: ToolkitId,
    pub github_url: String,
    pub icon: String,
}

/// Fields accepted when creating or editing a workflow.
#[derive(Debug, Clone)]
pub struct WorkflowInput {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub studio_id: StudioId,
    pub branch_name: String,
    pub datasets: String,
}

/// Fields accepted when creating or editing a dataset.
#[derive(Debug, Clone)]
pub struct DatasetInput {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub icon: String,
    pub use_case: String,
    pub features: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_list_trims_and_drops_blanks() {
        let toolkit = Toolkit {
            id: ToolkitId::new(1),
            name: "Brick".to_owned(),
            slug: Slug::parse("brick").unwrap(),
            description: String::new(),
            github_url: String::new(),
            icon: String::new(),
            color: "#43e97b".to_owned(),
            modules: "  io \n\n models\n".to_owned(),
        };
        assert_eq!(toolkit.modules_list(), vec!["io", "models"]);
    }

    #[test]
    fn test_lines_list_empty_field() {
        let dataset = Dataset {
            id: DatasetId::new(1),
            name: "Scenes".to_owned(),
            slug: Slug::parse("scenes").unwrap(),
            description: String::new(),
            icon: String::new(),
            use_case: String::new(),
            features: String::new(),
        };
        assert!(dataset.features_list().is_empty());
    }
}
