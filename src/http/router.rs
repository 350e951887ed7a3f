//! Router configuration for the HTTP application.
//!
//! Assembles the domain API under `/api`, the static frontend (when a build
//! directory exists) and the middleware stack (compression, tracing, CORS).

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use super::frontend::{self, FrontendError};
use super::handlers;
use super::origins;
use super::state::AppState;
use crate::config::Settings;

/// Domain router mounted under the API prefix.
///
/// The full route table is owned by the domain layer; this shell mounts the
/// endpoints it owns itself.
fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/flows", get(handlers::list_flows))
        .route("/flows/{flow_id}", get(handlers::get_flow))
}

/// Create the application router with all routes and middleware.
///
/// `dist_dir` is the resolved frontend build directory; `None` runs the
/// process API-only with no SPA fallback registered.
///
/// # Errors
/// Fails if a build directory is present but misconfigured (no assets
/// subdirectory), which must abort startup.
pub fn create_router(
    state: AppState,
    settings: &Settings,
    dist_dir: Option<&Path>,
) -> Result<Router, FrontendError> {
    let mut app = Router::new().nest("/api", api_router().with_state(state));

    // SPA fallback registers below the domain router: unmatched non-API
    // paths fall through to the frontend shell.
    if let Some(dist) = dist_dir {
        app = app.merge(frontend::frontend_router(dist)?);
    }

    Ok(app
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(origins::cors_layer(settings)))
}
