//! Login/logout and password change flow tests.

use sqlx::SqlitePool;

use neurolab_integration_tests::{
    body_text, create_account, get_with_cookie, location, login, post_form, test_app,
};

#[sqlx::test(migrations = "../site/migrations")]
async fn login_and_logout(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;

    let cookie = login(&app, "ada", "correct-horse-battery").await;

    // Session works.
    let html = body_text(get_with_cookie(&app, "/", &cookie).await).await;
    assert!(html.contains("Log out"));

    // Logout clears it.
    let response = post_form(&app, "/accounts/logout", "", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn login_rejects_wrong_password(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;

    let response = post_form(
        &app,
        "/accounts/login",
        "username=ada&password=wrong",
        None,
    )
    .await;

    // Re-rendered with a form-level error, no redirect.
    assert_eq!(response.status(), 200);
    let html = body_text(response).await;
    assert!(html.contains("Please enter a correct username and password"));
}

#[sqlx::test(migrations = "../site/migrations")]
async fn login_honors_next_parameter(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;

    let response = post_form(
        &app,
        "/accounts/login",
        "username=ada&password=correct-horse-battery&next=%2Fdatasets",
        None,
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/datasets");

    // Off-site targets are not followed.
    let response = post_form(
        &app,
        "/accounts/login",
        "username=ada&password=correct-horse-battery&next=https%3A%2F%2Fevil.example",
        None,
    )
    .await;
    assert_eq!(location(&response), "/");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn password_change_requires_login(pool: SqlitePool) {
    let app = test_app(pool).await;
    let response = neurolab_integration_tests::get(&app, "/accounts/password-change").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/accounts/login");
}

#[sqlx::test(migrations = "../site/migrations")]
async fn password_change_roundtrip(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;
    let cookie = login(&app, "ada", "correct-horse-battery").await;

    let body = "old_password=correct-horse-battery\
         &new_password1=another-fine-phrase&new_password2=another-fine-phrase";
    let response = post_form(&app, "/accounts/password-change", body, Some(&cookie)).await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("Your password was changed."));

    // The old password no longer works, the new one does.
    let response = post_form(
        &app,
        "/accounts/login",
        "username=ada&password=correct-horse-battery",
        None,
    )
    .await;
    assert_eq!(response.status(), 200);
    login(&app, "ada", "another-fine-phrase").await;
}

#[sqlx::test(migrations = "../site/migrations")]
async fn profile_update_roundtrip(pool: SqlitePool) {
    create_account(&pool, "ada", "correct-horse-battery", false).await;
    let app = test_app(pool.clone()).await;
    let cookie = login(&app, "ada", "correct-horse-battery").await;

    let body = "first_name=Ada&last_name=Lovelace&email=ada%40example.com\
         &uni_email=&github_username=adal&basecamp_id=";
    let response = post_form(&app, "/accounts/profile", body, Some(&cookie)).await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("Profile saved."));

    let html = body_text(get_with_cookie(&app, "/accounts/profile", &cookie).await).await;
    assert!(html.contains("Lovelace"));
}
