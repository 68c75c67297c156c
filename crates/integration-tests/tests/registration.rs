//! Registration flow tests.

use sqlx::SqlitePool;

use neurolab_integration_tests::{body_text, get_with_cookie, location, post_form, session_cookie, test_app};
use neurolab_site::db::users::{UserListFilter, UserRepository};

const VALID_FORM: &str = "username=ada&email=ada%40example.com&first_name=Ada&last_name=Lovelace\
     &uni_email=&github_username=adal&basecamp_id=&supervisor=Prof.+Pipa\
     &project_start_date=2026-04-01&password1=correct-horse-battery&password2=correct-horse-battery";

#[sqlx::test(migrations = "../site/migrations")]
async fn register_creates_account_and_session(pool: SqlitePool) {
    let app = test_app(pool.clone()).await;

    let response = post_form(&app, "/register", VALID_FORM, None).await;
    assert!(response.status().is_redirection(), "got {}", response.status());
    assert_eq!(location(&response), "/");

    // The response starts an authenticated session.
    let cookie = session_cookie(&response).expect("session cookie set");
    let home = get_with_cookie(&app, "/", &cookie).await;
    let html = body_text(home).await;
    assert!(html.contains("ada"), "logged-in navigation shows the username");
    assert!(html.contains("Log out"));

    // Exactly one account was created.
    let users = UserRepository::new(&pool)
        .list(&UserListFilter::default())
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    let user = users.first().unwrap();
    assert_eq!(user.username, "ada");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.supervisor, "Prof. Pipa");
    assert!(!user.is_staff);
}

#[sqlx::test(migrations = "../site/migrations")]
async fn register_duplicate_username_rerenders_form(pool: SqlitePool) {
    let app = test_app(pool.clone()).await;

    post_form(&app, "/register", VALID_FORM, None).await;
    let response = post_form(&app, "/register", VALID_FORM, None).await;

    // Invalid form: re-rendered, not redirected.
    assert_eq!(response.status(), 200);
    let html = body_text(response).await;
    assert!(html.contains("A user with that username already exists."));

    let users = UserRepository::new(&pool)
        .list(&UserListFilter::default())
        .await
        .unwrap();
    assert_eq!(users.len(), 1, "no second account was created");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn register_password_mismatch_writes_nothing(pool: SqlitePool) {
    let app = test_app(pool.clone()).await;

    let body = "username=ada&password1=correct-horse-battery&password2=different-entirely";
    let response = post_form(&app, "/register", body, None).await;

    assert_eq!(response.status(), 200);
    let html = body_text(response).await;
    // The apostrophe may be HTML-escaped; match around it.
    assert!(html.contains("The two password fields didn"), "got: {html}");

    let users = UserRepository::new(&pool)
        .list(&UserListFilter::default())
        .await
        .unwrap();
    assert!(users.is_empty());
}

#[sqlx::test(migrations = "../site/migrations")]
async fn register_page_renders(pool: SqlitePool) {
    let app = test_app(pool).await;
    let response = neurolab_integration_tests::get(&app, "/register").await;
    assert_eq!(response.status(), 200);
    let html = body_text(response).await;
    assert!(html.contains("Username"));
    assert!(html.contains("Password confirmation"));
}
