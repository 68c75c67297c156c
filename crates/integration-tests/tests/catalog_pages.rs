//! Catalog page tests: listings, slug lookups, 404 behavior.

use sqlx::SqlitePool;

use neurolab_core::Slug;
use neurolab_integration_tests::{body_text, get, test_app};
use neurolab_site::db::CatalogRepository;
use neurolab_site::models::catalog::{DatasetInput, StudioInput, ToolkitInput, WorkflowInput};

fn toolkit(name: &str, slug: &str) -> ToolkitInput {
    ToolkitInput {
        name: name.to_owned(),
        slug: Slug::parse(slug).unwrap(),
        description: "A **useful** toolkit.".to_owned(),
        github_url: String::new(),
        icon: String::new(),
        color: "#43e97b".to_owned(),
        modules: "io\nmodels".to_owned(),
    }
}

fn studio(name: &str, slug: &str, toolkit_id: neurolab_core::ToolkitId) -> StudioInput {
    StudioInput {
        name: name.to_owned(),
        slug: Slug::parse(slug).unwrap(),
        description: String::new(),
        toolkit_id,
        github_url: String::new(),
        icon: String::new(),
    }
}

#[sqlx::test(migrations = "../site/migrations")]
async fn dashboard_lists_toolkits_with_studios(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    let toolkit_id = repo.create_toolkit(&toolkit("NeuroBricks", "neurobricks")).await.unwrap();
    repo.create_studio(&studio("Vision Studio", "vision", toolkit_id))
        .await
        .unwrap();

    let app = test_app(pool.clone()).await;
    let response = get(&app, "/").await;
    assert_eq!(response.status(), 200);

    let html = body_text(response).await;
    assert!(html.contains("NeuroBricks"));
    assert!(html.contains("Vision Studio"));
    // The markdown description renders to HTML.
    assert!(html.contains("<strong>useful</strong>"));
}

#[sqlx::test(migrations = "../site/migrations")]
async fn toolkit_detail_404_on_missing_slug(pool: SqlitePool) {
    let app = test_app(pool).await;
    let response = get(&app, "/toolkit/not-there").await;
    assert_eq!(response.status(), 404);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn studio_detail_404_on_missing_slug(pool: SqlitePool) {
    let app = test_app(pool).await;
    let response = get(&app, "/studio/not-there").await;
    assert_eq!(response.status(), 404);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn dataset_detail_by_slug(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    repo.create_dataset(&DatasetInput {
        name: "Natural Scenes".to_owned(),
        slug: Slug::parse("natural-scenes").unwrap(),
        description: String::new(),
        icon: String::new(),
        use_case: String::new(),
        features: "7T fMRI\n8 subjects".to_owned(),
    })
    .await
    .unwrap();

    let app = test_app(pool.clone()).await;

    let response = get(&app, "/dataset/natural-scenes").await;
    assert_eq!(response.status(), 200);
    let html = body_text(response).await;
    assert!(html.contains("Natural Scenes"));
    assert!(html.contains("7T fMRI"));

    let response = get(&app, "/dataset/not-there").await;
    assert_eq!(response.status(), 404);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn workflow_detail_requires_matching_studio(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    let toolkit_id = repo.create_toolkit(&toolkit("NeuroBricks", "neurobricks")).await.unwrap();
    let vision = repo
        .create_studio(&studio("Vision", "vision", toolkit_id))
        .await
        .unwrap();
    repo.create_studio(&studio("Audio", "audio", toolkit_id))
        .await
        .unwrap();
    repo.create_workflow(&WorkflowInput {
        name: "Scene Decoding".to_owned(),
        slug: Slug::parse("scene-decoding").unwrap(),
        description: String::new(),
        studio_id: vision,
        branch_name: String::new(),
        datasets: String::new(),
    })
    .await
    .unwrap();

    let app = test_app(pool.clone()).await;

    // Right studio: found.
    let response = get(&app, "/studio/vision/workflow/scene-decoding").await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("Scene Decoding"));

    // The workflow exists, but under a different studio.
    let response = get(&app, "/studio/audio/workflow/scene-decoding").await;
    assert_eq!(response.status(), 404);

    // Unknown studio.
    let response = get(&app, "/studio/nope/workflow/scene-decoding").await;
    assert_eq!(response.status(), 404);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn listings_are_name_ordered(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    repo.create_toolkit(&toolkit("Zeta", "zeta")).await.unwrap();
    repo.create_toolkit(&toolkit("Alpha", "alpha")).await.unwrap();

    let app = test_app(pool.clone()).await;
    let html = body_text(get(&app, "/toolkits").await).await;

    let alpha = html.find("Alpha").expect("Alpha rendered");
    let zeta = html.find("Zeta").expect("Zeta rendered");
    assert!(alpha < zeta, "Alpha should be listed before Zeta");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn health_endpoints(pool: SqlitePool) {
    let app = test_app(pool).await;
    assert_eq!(get(&app, "/health").await.status(), 200);
    assert_eq!(get(&app, "/health/ready").await.status(), 200);
}
