//! HTTP layer for the hedge fund backend.
//!
//! Composes the axum application: the domain API mounted under `/api`, the
//! prebuilt single-page frontend with SPA fallback routing (when a build
//! directory exists), and the middleware stack (compression, request tracing,
//! CORS per the origin policy).

pub mod error;
pub mod frontend;
pub mod handlers;
pub mod origins;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
