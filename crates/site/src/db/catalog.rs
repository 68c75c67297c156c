//! Catalog repository: toolkits, studios, workflows and datasets.
//!
//! Public list views need whole sub-trees (toolkits with studios, studios
//! with workflows), so the list operations batch one query per level and
//! group the children in memory instead of issuing per-row lookups.
//!
//! Deleting a toolkit or studio traverses its children inside a single
//! transaction; the schema itself does not cascade.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use neurolab_core::{DatasetId, StudioId, ToolkitId, WorkflowId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::catalog::{
    Dataset, DatasetInput, Studio, StudioInput, StudioWithWorkflows, Toolkit, ToolkitInput,
    ToolkitWithStudios, Workflow, WorkflowInput,
};

const TOOLKIT_COLUMNS: &str = "id, name, slug, description, github_url, icon, color, modules";
const STUDIO_COLUMNS: &str = "id, name, slug, description, toolkit_id, github_url, icon";
const WORKFLOW_COLUMNS: &str = "id, name, slug, description, studio_id, branch_name, datasets";
const DATASET_COLUMNS: &str = "id, name, slug, description, icon, use_case, features";

/// Entity counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct CatalogCounts {
    pub toolkits: i64,
    pub studios: i64,
    pub workflows: i64,
    pub datasets: i64,
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Toolkits
    // =========================================================================

    /// All toolkits ordered by name, without children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_toolkits(&self) -> Result<Vec<Toolkit>, RepositoryError> {
        let toolkits = sqlx::query_as::<_, Toolkit>(&format!(
            "SELECT {TOOLKIT_COLUMNS} FROM toolkit ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(toolkits)
    }

    /// All toolkits with their studios eagerly attached, ordered by name.
    ///
    /// Two queries total regardless of row counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_toolkits_with_studios(
        &self,
    ) -> Result<Vec<ToolkitWithStudios>, RepositoryError> {
        let toolkits = self.list_toolkits().await?;

        let studios = sqlx::query_as::<_, Studio>(&format!(
            "SELECT {STUDIO_COLUMNS} FROM studio ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        let mut by_toolkit: HashMap<ToolkitId, Vec<Studio>> = HashMap::new();
        for studio in studios {
            by_toolkit.entry(studio.toolkit_id).or_default().push(studio);
        }

        Ok(toolkits
            .into_iter()
            .map(|toolkit| ToolkitWithStudios {
                studios: by_toolkit.remove(&toolkit.id).unwrap_or_default(),
                toolkit,
            })
            .collect())
    }

    /// Look up a toolkit by slug, with its studios.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_toolkit_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ToolkitWithStudios>, RepositoryError> {
        let toolkit = sqlx::query_as::<_, Toolkit>(&format!(
            "SELECT {TOOLKIT_COLUMNS} FROM toolkit WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(toolkit) = toolkit else {
            return Ok(None);
        };

        let studios = sqlx::query_as::<_, Studio>(&format!(
            "SELECT {STUDIO_COLUMNS} FROM studio WHERE toolkit_id = ? ORDER BY name ASC"
        ))
        .bind(toolkit.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ToolkitWithStudios { toolkit, studios }))
    }

    /// Get a toolkit by ID (admin edit screen).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_toolkit(&self, id: ToolkitId) -> Result<Option<Toolkit>, RepositoryError> {
        let toolkit = sqlx::query_as::<_, Toolkit>(&format!(
            "SELECT {TOOLKIT_COLUMNS} FROM toolkit WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(toolkit)
    }

    /// Admin listing with optional search over name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_toolkits(&self, q: Option<&str>) -> Result<Vec<Toolkit>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {TOOLKIT_COLUMNS} FROM toolkit WHERE 1 = 1"));
        push_search(&mut qb, q, &["name", "description"]);
        qb.push(" ORDER BY name ASC");

        let toolkits = qb.build_query_as::<Toolkit>().fetch_all(self.pool).await?;
        Ok(toolkits)
    }

    /// Create a toolkit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_toolkit(&self, input: &ToolkitInput) -> Result<ToolkitId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO toolkit (name, slug, description, github_url, icon, color, modules) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.github_url)
        .bind(&input.icon)
        .bind(&input.color)
        .bind(&input.modules)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "toolkit slug"))?;

        Ok(ToolkitId::new(result.last_insert_rowid()))
    }

    /// Update a toolkit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::NotFound` if the toolkit doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_toolkit(
        &self,
        id: ToolkitId,
        input: &ToolkitInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE toolkit SET name = ?, slug = ?, description = ?, github_url = ?, \
             icon = ?, color = ?, modules = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.github_url)
        .bind(&input.icon)
        .bind(&input.color)
        .bind(&input.modules)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "toolkit slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a toolkit and, transitively, its studios and their workflows.
    ///
    /// The traversal runs in one transaction: either the whole sub-tree is
    /// removed or nothing is.
    ///
    /// # Returns
    ///
    /// Returns `true` if the toolkit existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn delete_toolkit(&self, id: ToolkitId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM workflow WHERE studio_id IN \
             (SELECT id FROM studio WHERE toolkit_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM studio WHERE toolkit_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM toolkit WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Studios
    // =========================================================================

    /// All studios ordered by name, without children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_studios(&self) -> Result<Vec<Studio>, RepositoryError> {
        let studios = sqlx::query_as::<_, Studio>(&format!(
            "SELECT {STUDIO_COLUMNS} FROM studio ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(studios)
    }

    /// All studios with their toolkit and workflows eagerly attached.
    ///
    /// Three queries total regardless of row counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a studio references a
    /// toolkit that is missing.
    pub async fn list_studios_with_workflows(
        &self,
    ) -> Result<Vec<StudioWithWorkflows>, RepositoryError> {
        let studios = self.list_studios().await?;
        let toolkits = self.list_toolkits().await?;

        let workflows = sqlx::query_as::<_, Workflow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflow ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        let toolkit_by_id: HashMap<ToolkitId, Toolkit> =
            toolkits.into_iter().map(|t| (t.id, t)).collect();

        let mut by_studio: HashMap<StudioId, Vec<Workflow>> = HashMap::new();
        for workflow in workflows {
            by_studio.entry(workflow.studio_id).or_default().push(workflow);
        }

        studios
            .into_iter()
            .map(|studio| {
                let toolkit = toolkit_by_id
                    .get(&studio.toolkit_id)
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "studio {} references missing toolkit {}",
                            studio.id, studio.toolkit_id
                        ))
                    })?;
                Ok(StudioWithWorkflows {
                    workflows: by_studio.remove(&studio.id).unwrap_or_default(),
                    toolkit,
                    studio,
                })
            })
            .collect()
    }

    /// Look up a studio by slug, with its toolkit and workflows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the owning toolkit is
    /// missing.
    pub async fn get_studio_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<StudioWithWorkflows>, RepositoryError> {
        let studio = sqlx::query_as::<_, Studio>(&format!(
            "SELECT {STUDIO_COLUMNS} FROM studio WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(studio) = studio else {
            return Ok(None);
        };

        let toolkit = self.get_toolkit(studio.toolkit_id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "studio {} references missing toolkit {}",
                studio.id, studio.toolkit_id
            ))
        })?;

        let workflows = sqlx::query_as::<_, Workflow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflow WHERE studio_id = ? ORDER BY name ASC"
        ))
        .bind(studio.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(StudioWithWorkflows {
            studio,
            toolkit,
            workflows,
        }))
    }

    /// Get a studio by ID (admin edit screen).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_studio(&self, id: StudioId) -> Result<Option<Studio>, RepositoryError> {
        let studio = sqlx::query_as::<_, Studio>(&format!(
            "SELECT {STUDIO_COLUMNS} FROM studio WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(studio)
    }

    /// Admin listing with optional search and toolkit filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_studios(
        &self,
        q: Option<&str>,
        toolkit: Option<ToolkitId>,
    ) -> Result<Vec<Studio>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {STUDIO_COLUMNS} FROM studio WHERE 1 = 1"));

        if let Some(toolkit_id) = toolkit {
            qb.push(" AND toolkit_id = ").push_bind(toolkit_id);
        }
        push_search(&mut qb, q, &["name", "description"]);
        qb.push(" ORDER BY name ASC");

        let studios = qb.build_query_as::<Studio>().fetch_all(self.pool).await?;
        Ok(studios)
    }

    /// Create a studio.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors
    /// (including an invalid toolkit reference).
    pub async fn create_studio(&self, input: &StudioInput) -> Result<StudioId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO studio (name, slug, description, toolkit_id, github_url, icon) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.toolkit_id)
        .bind(&input.github_url)
        .bind(&input.icon)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "studio slug"))?;

        Ok(StudioId::new(result.last_insert_rowid()))
    }

    /// Update a studio.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::NotFound` if the studio doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_studio(
        &self,
        id: StudioId,
        input: &StudioInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE studio SET name = ?, slug = ?, description = ?, toolkit_id = ?, \
             github_url = ?, icon = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.toolkit_id)
        .bind(&input.github_url)
        .bind(&input.icon)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "studio slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a studio and its workflows in one transaction.
    ///
    /// # Returns
    ///
    /// Returns `true` if the studio existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn delete_studio(&self, id: StudioId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM workflow WHERE studio_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM studio WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Workflows
    // =========================================================================

    /// Look up a workflow by its owning studio and per-studio slug.
    ///
    /// Returns `None` when the slug exists only under a different studio;
    /// workflow slugs are not globally unique.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_workflow(
        &self,
        studio_id: StudioId,
        slug: &str,
    ) -> Result<Option<Workflow>, RepositoryError> {
        let workflow = sqlx::query_as::<_, Workflow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflow WHERE studio_id = ? AND slug = ?"
        ))
        .bind(studio_id)
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(workflow)
    }

    /// Get a workflow by ID (admin edit screen).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_workflow_by_id(
        &self,
        id: WorkflowId,
    ) -> Result<Option<Workflow>, RepositoryError> {
        let workflow = sqlx::query_as::<_, Workflow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflow WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(workflow)
    }

    /// Admin listing with optional search, studio filter, and toolkit filter
    /// (the latter reaches through the owning studio).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_workflows(
        &self,
        q: Option<&str>,
        studio: Option<StudioId>,
        toolkit: Option<ToolkitId>,
    ) -> Result<Vec<Workflow>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflow WHERE 1 = 1"
        ));

        if let Some(studio_id) = studio {
            qb.push(" AND studio_id = ").push_bind(studio_id);
        }
        if let Some(toolkit_id) = toolkit {
            qb.push(" AND studio_id IN (SELECT id FROM studio WHERE toolkit_id = ")
                .push_bind(toolkit_id)
                .push(")");
        }
        push_search(&mut qb, q, &["name", "description"]);
        qb.push(" ORDER BY name ASC");

        let workflows = qb.build_query_as::<Workflow>().fetch_all(self.pool).await?;
        Ok(workflows)
    }

    /// Create a workflow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the (studio, slug) pair is
    /// taken. Returns `RepositoryError::Database` for other database errors.
    pub async fn create_workflow(
        &self,
        input: &WorkflowInput,
    ) -> Result<WorkflowId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO workflow (name, slug, description, studio_id, branch_name, datasets) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.studio_id)
        .bind(&input.branch_name)
        .bind(&input.datasets)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "workflow slug"))?;

        Ok(WorkflowId::new(result.last_insert_rowid()))
    }

    /// Update a workflow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new (studio, slug) pair is
    /// taken. Returns `RepositoryError::NotFound` if the workflow doesn't
    /// exist. Returns `RepositoryError::Database` for other database errors.
    pub async fn update_workflow(
        &self,
        id: WorkflowId,
        input: &WorkflowInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE workflow SET name = ?, slug = ?, description = ?, studio_id = ?, \
             branch_name = ?, datasets = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.studio_id)
        .bind(&input.branch_name)
        .bind(&input.datasets)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "workflow slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a workflow.
    ///
    /// # Returns
    ///
    /// Returns `true` if the workflow existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_workflow(&self, id: WorkflowId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM workflow WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    /// All datasets ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, RepositoryError> {
        let datasets = sqlx::query_as::<_, Dataset>(&format!(
            "SELECT {DATASET_COLUMNS} FROM dataset ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(datasets)
    }

    /// Look up a dataset by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_dataset_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Dataset>, RepositoryError> {
        let dataset = sqlx::query_as::<_, Dataset>(&format!(
            "SELECT {DATASET_COLUMNS} FROM dataset WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(dataset)
    }

    /// Get a dataset by ID (admin edit screen).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_dataset(&self, id: DatasetId) -> Result<Option<Dataset>, RepositoryError> {
        let dataset = sqlx::query_as::<_, Dataset>(&format!(
            "SELECT {DATASET_COLUMNS} FROM dataset WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(dataset)
    }

    /// Admin listing with optional search over name, description and use case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_datasets(&self, q: Option<&str>) -> Result<Vec<Dataset>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {DATASET_COLUMNS} FROM dataset WHERE 1 = 1"));
        push_search(&mut qb, q, &["name", "description", "use_case"]);
        qb.push(" ORDER BY name ASC");

        let datasets = qb.build_query_as::<Dataset>().fetch_all(self.pool).await?;
        Ok(datasets)
    }

    /// Create a dataset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_dataset(&self, input: &DatasetInput) -> Result<DatasetId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO dataset (name, slug, description, icon, use_case, features) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.use_case)
        .bind(&input.features)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "dataset slug"))?;

        Ok(DatasetId::new(result.last_insert_rowid()))
    }

    /// Update a dataset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::NotFound` if the dataset doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_dataset(
        &self,
        id: DatasetId,
        input: &DatasetInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE dataset SET name = ?, slug = ?, description = ?, icon = ?, \
             use_case = ?, features = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.use_case)
        .bind(&input.features)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "dataset slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a dataset.
    ///
    /// # Returns
    ///
    /// Returns `true` if the dataset existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_dataset(&self, id: DatasetId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM dataset WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Counts
    // =========================================================================

    /// Entity counts for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<CatalogCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, CatalogCounts>(
            "SELECT \
             (SELECT COUNT(*) FROM toolkit) AS toolkits, \
             (SELECT COUNT(*) FROM studio) AS studios, \
             (SELECT COUNT(*) FROM workflow) AS workflows, \
             (SELECT COUNT(*) FROM dataset) AS datasets",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }
}

/// Append `AND (col LIKE ?q OR ...)` for a non-empty search term.
fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, q: Option<&str>, columns: &[&str]) {
    let Some(q) = q else {
        return;
    };
    if q.is_empty() {
        return;
    }

    let pattern = format!("%{q}%");
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("{column} LIKE "));
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neurolab_core::Slug;

    fn toolkit_input(name: &str, slug: &str) -> ToolkitInput {
        ToolkitInput {
            name: name.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: "A base package.".to_owned(),
            github_url: String::new(),
            icon: String::new(),
            color: "#43e97b".to_owned(),
            modules: String::new(),
        }
    }

    fn studio_input(name: &str, slug: &str, toolkit_id: ToolkitId) -> StudioInput {
        StudioInput {
            name: name.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: String::new(),
            toolkit_id,
            github_url: String::new(),
            icon: String::new(),
        }
    }

    fn workflow_input(name: &str, slug: &str, studio_id: StudioId) -> WorkflowInput {
        WorkflowInput {
            name: name.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: String::new(),
            studio_id,
            branch_name: String::new(),
            datasets: String::new(),
        }
    }

    fn dataset_input(name: &str, slug: &str) -> DatasetInput {
        DatasetInput {
            name: name.to_owned(),
            slug: Slug::parse(slug).unwrap(),
            description: String::new(),
            icon: String::new(),
            use_case: String::new(),
            features: String::new(),
        }
    }

    #[sqlx::test]
    async fn test_toolkit_list_ordered_by_name(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        for (name, slug) in [("Zeta", "zeta"), ("Alpha", "alpha"), ("Mid", "mid")] {
            repo.create_toolkit(&toolkit_input(name, slug)).await.unwrap();
        }

        let toolkits = repo.list_toolkits().await.unwrap();
        let names: Vec<_> = toolkits.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[sqlx::test]
    async fn test_duplicate_toolkit_slug_is_conflict(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        repo.create_toolkit(&toolkit_input("One", "brick")).await.unwrap();
        let err = repo
            .create_toolkit(&toolkit_input("Two", "brick"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[sqlx::test]
    async fn test_toolkit_by_slug_with_studios(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let toolkit_id = repo.create_toolkit(&toolkit_input("Brick", "brick")).await.unwrap();
        repo.create_studio(&studio_input("Vision", "vision", toolkit_id))
            .await
            .unwrap();
        repo.create_studio(&studio_input("Audio", "audio", toolkit_id))
            .await
            .unwrap();

        let found = repo.get_toolkit_by_slug("brick").await.unwrap().unwrap();
        assert_eq!(found.toolkit.name, "Brick");
        let studio_names: Vec<_> = found.studios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(studio_names, vec!["Audio", "Vision"]);

        assert!(repo.get_toolkit_by_slug("missing").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_list_toolkits_with_studios_groups_children(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let a = repo.create_toolkit(&toolkit_input("A", "a")).await.unwrap();
        let b = repo.create_toolkit(&toolkit_input("B", "b")).await.unwrap();
        repo.create_studio(&studio_input("S1", "s1", a)).await.unwrap();
        repo.create_studio(&studio_input("S2", "s2", b)).await.unwrap();
        repo.create_studio(&studio_input("S3", "s3", a)).await.unwrap();

        let listing = repo.list_toolkits_with_studios().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing.first().unwrap().studios.len(), 2);
        assert_eq!(listing.get(1).unwrap().studios.len(), 1);
    }

    #[sqlx::test]
    async fn test_workflow_compound_lookup(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let toolkit_id = repo.create_toolkit(&toolkit_input("Brick", "brick")).await.unwrap();
        let vision = repo
            .create_studio(&studio_input("Vision", "vision", toolkit_id))
            .await
            .unwrap();
        let audio = repo
            .create_studio(&studio_input("Audio", "audio", toolkit_id))
            .await
            .unwrap();
        repo.create_workflow(&workflow_input("Decode", "decode", vision))
            .await
            .unwrap();

        // Same slug, right studio: found.
        assert!(repo.get_workflow(vision, "decode").await.unwrap().is_some());
        // Same slug, wrong studio: not found.
        assert!(repo.get_workflow(audio, "decode").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_workflow_slug_unique_per_studio_only(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let toolkit_id = repo.create_toolkit(&toolkit_input("Brick", "brick")).await.unwrap();
        let vision = repo
            .create_studio(&studio_input("Vision", "vision", toolkit_id))
            .await
            .unwrap();
        let audio = repo
            .create_studio(&studio_input("Audio", "audio", toolkit_id))
            .await
            .unwrap();

        repo.create_workflow(&workflow_input("Decode", "decode", vision))
            .await
            .unwrap();
        // Same slug under a different studio is fine.
        repo.create_workflow(&workflow_input("Decode", "decode", audio))
            .await
            .unwrap();
        // Same slug under the same studio conflicts.
        let err = repo
            .create_workflow(&workflow_input("Decode again", "decode", vision))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[sqlx::test]
    async fn test_delete_toolkit_cascades(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let toolkit_id = repo.create_toolkit(&toolkit_input("Brick", "brick")).await.unwrap();
        let studio_id = repo
            .create_studio(&studio_input("Vision", "vision", toolkit_id))
            .await
            .unwrap();
        repo.create_workflow(&workflow_input("Decode", "decode", studio_id))
            .await
            .unwrap();

        // Unrelated rows must survive.
        let other_toolkit = repo.create_toolkit(&toolkit_input("Other", "other")).await.unwrap();
        let other_studio = repo
            .create_studio(&studio_input("Motor", "motor", other_toolkit))
            .await
            .unwrap();

        assert!(repo.delete_toolkit(toolkit_id).await.unwrap());

        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.toolkits, 1);
        assert_eq!(counts.studios, 1);
        assert_eq!(counts.workflows, 0);
        assert!(repo.get_studio(other_studio).await.unwrap().is_some());
    }

    #[sqlx::test]
    async fn test_delete_studio_cascades_to_workflows(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let toolkit_id = repo.create_toolkit(&toolkit_input("Brick", "brick")).await.unwrap();
        let studio_id = repo
            .create_studio(&studio_input("Vision", "vision", toolkit_id))
            .await
            .unwrap();
        repo.create_workflow(&workflow_input("Decode", "decode", studio_id))
            .await
            .unwrap();

        assert!(repo.delete_studio(studio_id).await.unwrap());

        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.studios, 0);
        assert_eq!(counts.workflows, 0);
        // The owning toolkit is untouched.
        assert_eq!(counts.toolkits, 1);
    }

    #[sqlx::test]
    async fn test_dataset_lookup_and_search(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let mut input = dataset_input("Scenes", "scenes");
        input.use_case = "naturalistic stimuli".to_owned();
        repo.create_dataset(&input).await.unwrap();
        repo.create_dataset(&dataset_input("Audio Books", "audio-books"))
            .await
            .unwrap();

        assert!(repo.get_dataset_by_slug("scenes").await.unwrap().is_some());
        assert!(repo.get_dataset_by_slug("nope").await.unwrap().is_none());

        let hits = repo.search_datasets(Some("naturalistic")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().name, "Scenes");

        let all = repo.search_datasets(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[sqlx::test]
    async fn test_search_workflows_by_toolkit(pool: SqlitePool) {
        let repo = CatalogRepository::new(&pool);

        let a = repo.create_toolkit(&toolkit_input("A", "a")).await.unwrap();
        let b = repo.create_toolkit(&toolkit_input("B", "b")).await.unwrap();
        let sa = repo.create_studio(&studio_input("SA", "sa", a)).await.unwrap();
        let sb = repo.create_studio(&studio_input("SB", "sb", b)).await.unwrap();
        repo.create_workflow(&workflow_input("WA", "wa", sa)).await.unwrap();
        repo.create_workflow(&workflow_input("WB", "wb", sb)).await.unwrap();

        let hits = repo.search_workflows(None, None, Some(a)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().name, "WA");

        let hits = repo.search_workflows(None, Some(sb), None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().name, "WB");
    }
}
