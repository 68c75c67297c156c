//! Seed the catalog with demo data.
//!
//! Inserts a small toolkit/studio/workflow tree plus a couple of datasets so
//! a fresh deployment has something to show. Refuses to run against a
//! non-empty catalog unless `--force` is given.

use thiserror::Error;

use neurolab_core::Slug;
use neurolab_site::db::CatalogRepository;
use neurolab_site::db::RepositoryError;
use neurolab_site::models::catalog::{DatasetInput, StudioInput, ToolkitInput, WorkflowInput};

use super::CliError;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Slug literal failed to parse.
    #[error("Invalid seed slug: {0}")]
    Slug(#[from] neurolab_core::SlugError),

    /// The catalog already has records.
    #[error("Catalog is not empty; re-run with --force to seed anyway")]
    NotEmpty,
}

/// Insert the demo catalog.
///
/// # Errors
///
/// Returns `SeedError::NotEmpty` when the catalog has records and `force`
/// is false.
pub async fn run(force: bool) -> Result<(), SeedError> {
    let pool = super::connect().await?;
    let repo = CatalogRepository::new(&pool);

    let counts = repo.counts().await?;
    if !force && (counts.toolkits > 0 || counts.datasets > 0) {
        return Err(SeedError::NotEmpty);
    }

    tracing::info!("Seeding demo catalog...");

    let bricks = repo
        .create_toolkit(&ToolkitInput {
            name: "NeuroBricks".to_owned(),
            slug: Slug::parse("neurobricks")?,
            description: "Foundational building blocks for lab experiments:\n\
                          data loading, preprocessing and model scaffolding."
                .to_owned(),
            github_url: "https://github.com/neurolab/neurobricks".to_owned(),
            icon: "🧱".to_owned(),
            color: "#43e97b".to_owned(),
            modules: "io\npreprocessing\nmodels\nevaluation".to_owned(),
        })
        .await?;

    let vision = repo
        .create_studio(&StudioInput {
            name: "Vision Studio".to_owned(),
            slug: Slug::parse("vision-studio")?,
            description: "Visual encoding and decoding workflows.".to_owned(),
            toolkit_id: bricks,
            github_url: "https://github.com/neurolab/vision-studio".to_owned(),
            icon: "👁".to_owned(),
        })
        .await?;

    repo.create_workflow(&WorkflowInput {
        name: "Scene Decoding".to_owned(),
        slug: Slug::parse("scene-decoding")?,
        description: "Decode natural scene categories from fMRI responses.".to_owned(),
        studio_id: vision,
        branch_name: "scene-decoding".to_owned(),
        datasets: "Natural Scenes\nCOCO captions".to_owned(),
    })
    .await?;

    let signals = repo
        .create_toolkit(&ToolkitInput {
            name: "SignalKit".to_owned(),
            slug: Slug::parse("signalkit")?,
            description: "Time-series tooling for EEG/MEG pipelines.".to_owned(),
            github_url: "https://github.com/neurolab/signalkit".to_owned(),
            icon: "📈".to_owned(),
            color: "#4facfe".to_owned(),
            modules: "filters\nepochs\nspectra".to_owned(),
        })
        .await?;

    repo.create_studio(&StudioInput {
        name: "EEG Studio".to_owned(),
        slug: Slug::parse("eeg-studio")?,
        description: "Event-related potential experiments.".to_owned(),
        toolkit_id: signals,
        github_url: String::new(),
        icon: "🧠".to_owned(),
    })
    .await?;

    repo.create_dataset(&DatasetInput {
        name: "Natural Scenes".to_owned(),
        slug: Slug::parse("natural-scenes")?,
        description: "Large-scale fMRI responses to natural scene photographs.".to_owned(),
        icon: "🏞".to_owned(),
        use_case: "Encoding and decoding models of high-level vision.".to_owned(),
        features: "7T fMRI\n8 subjects\n70k trials".to_owned(),
    })
    .await?;

    repo.create_dataset(&DatasetInput {
        name: "Sleep EEG".to_owned(),
        slug: Slug::parse("sleep-eeg")?,
        description: "Overnight polysomnography recordings.".to_owned(),
        icon: "😴".to_owned(),
        use_case: "Sleep stage classification baselines.".to_owned(),
        features: "64 channels\nannotated stages".to_owned(),
    })
    .await?;

    tracing::info!("Seed complete!");
    Ok(())
}
