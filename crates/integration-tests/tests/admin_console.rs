//! Admin console tests: access control and CRUD screens.

use sqlx::SqlitePool;

use neurolab_core::Slug;
use neurolab_integration_tests::{
    body_text, create_account, get_with_cookie, location, login, post_form, test_app,
};
use neurolab_site::db::CatalogRepository;
use neurolab_site::models::catalog::{StudioInput, ToolkitInput, WorkflowInput};

async fn staff_cookie(pool: &SqlitePool, app: &axum::Router) -> String {
    create_account(pool, "root", "correct-horse-battery", true).await;
    login(app, "root", "correct-horse-battery").await
}

fn toolkit(name: &str, slug: &str) -> ToolkitInput {
    ToolkitInput {
        name: name.to_owned(),
        slug: Slug::parse(slug).unwrap(),
        description: String::new(),
        github_url: String::new(),
        icon: String::new(),
        color: "#43e97b".to_owned(),
        modules: String::new(),
    }
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_requires_login(pool: SqlitePool) {
    let app = test_app(pool).await;
    let response = neurolab_integration_tests::get(&app, "/admin").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/accounts/login");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_rejects_non_staff(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;
    let cookie = login(&app, "ada", "correct-horse-battery").await;

    let response = get_with_cookie(&app, "/admin", &cookie).await;
    assert_eq!(response.status(), 403);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_dashboard_shows_counts(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    repo.create_toolkit(&toolkit("NeuroBricks", "neurobricks")).await.unwrap();

    let app = test_app(pool.clone()).await;
    let cookie = staff_cookie(&pool, &app).await;

    let response = get_with_cookie(&app, "/admin", &cookie).await;
    assert_eq!(response.status(), 200);
    let html = body_text(response).await;
    assert!(html.contains("Site administration"));
    assert!(html.contains("Toolkits"));
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_creates_toolkit_with_derived_slug(pool: SqlitePool) {
    let app = test_app(pool.clone()).await;
    let cookie = staff_cookie(&pool, &app).await;

    // Slug left blank: derived from the name.
    let body = "name=Spike+Sorting&slug=&description=Sorters.&github_url=&icon=&color=&modules=";
    let response = post_form(&app, "/admin/toolkits/new", body, Some(&cookie)).await;
    assert!(response.status().is_redirection(), "got {}", response.status());
    assert_eq!(location(&response), "/admin/toolkits");

    let created = CatalogRepository::new(&pool)
        .get_toolkit_by_slug("spike-sorting")
        .await
        .unwrap()
        .expect("toolkit created under the derived slug");
    assert_eq!(created.toolkit.name, "Spike Sorting");
    // Blank color falls back to the default.
    assert_eq!(created.toolkit.color, "#43e97b");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_duplicate_slug_rerenders_with_error(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    repo.create_toolkit(&toolkit("One", "brick")).await.unwrap();

    let app = test_app(pool.clone()).await;
    let cookie = staff_cookie(&pool, &app).await;

    let body = "name=Two&slug=brick&description=&github_url=&icon=&color=&modules=";
    let response = post_form(&app, "/admin/toolkits/new", body, Some(&cookie)).await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("Toolkit with this Slug already exists."));

    // Nothing was written.
    assert_eq!(repo.counts().await.unwrap().toolkits, 1);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_delete_toolkit_cascades(pool: SqlitePool) {
    let repo = CatalogRepository::new(&pool);
    let toolkit_id = repo.create_toolkit(&toolkit("NeuroBricks", "neurobricks")).await.unwrap();
    let studio_id = repo
        .create_studio(&StudioInput {
            name: "Vision".to_owned(),
            slug: Slug::parse("vision").unwrap(),
            description: String::new(),
            toolkit_id,
            github_url: String::new(),
            icon: String::new(),
        })
        .await
        .unwrap();
    repo.create_workflow(&WorkflowInput {
        name: "Decode".to_owned(),
        slug: Slug::parse("decode").unwrap(),
        description: String::new(),
        studio_id,
        branch_name: String::new(),
        datasets: String::new(),
    })
    .await
    .unwrap();

    let app = test_app(pool.clone()).await;
    let cookie = staff_cookie(&pool, &app).await;

    // Confirm page names the record.
    let confirm_url = format!("/admin/toolkits/{}/delete", toolkit_id.as_i64());
    let response = get_with_cookie(&app, &confirm_url, &cookie).await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("NeuroBricks"));

    // The POST removes the whole sub-tree.
    let response = post_form(&app, &confirm_url, "", Some(&cookie)).await;
    assert!(response.status().is_redirection());

    let counts = repo.counts().await.unwrap();
    assert_eq!(counts.toolkits, 0);
    assert_eq!(counts.studios, 0);
    assert_eq!(counts.workflows, 0);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn admin_user_list_filters_by_staff(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;
    let cookie = staff_cookie(&pool, &app).await;

    let html = body_text(get_with_cookie(&app, "/admin/users?staff=1", &cookie).await).await;
    assert!(html.contains("root"));

    let html = body_text(get_with_cookie(&app, "/admin/users?staff=0", &cookie).await).await;
    assert!(html.contains("ada"));
}
