//! Application router assembly.
//!
//! Shared by the binary and the integration tests so both exercise the same
//! middleware stack.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::routes;
use crate::state::AppState;

/// Build the full application router.
///
/// Creates the session layer (and its backing table) against the state's
/// pool, then assembles all routes.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session store cannot be initialized.
pub async fn build(state: AppState) -> Result<Router, sqlx::Error> {
    let session_layer = middleware::create_session_layer(state.pool(), state.config()).await?;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/site/static"))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
