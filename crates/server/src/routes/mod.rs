//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (pings the store)
//!
//! # Users
//! POST   /api/users/register   - Create an account, returns user + token
//! POST   /api/users/login      - Password login, returns user + token
//!
//! # Records (requires bearer token)
//! POST   /api/records          - Create or update a record by client ID
//! GET    /api/records          - List the caller's records
//! DELETE /api/records/{id}     - Delete one of the caller's records
//!
//! # Everything else
//! GET    /*                    - Static files from the configured directory
//! ```

pub mod extract;
pub mod health;
pub mod records;
pub mod users;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
}

/// Create the record routes router.
pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list).post(records::upsert))
        .route("/{id}", delete(records::delete))
}

/// Build the complete application router.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/users", user_routes())
        .nest("/api/records", record_routes())
        .fallback_service(static_dir)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Request span; `request_id` is filled in by the request ID middleware.
fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}
