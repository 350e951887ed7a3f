//! Hedge Fund Backend Server Binary
//!
//! Entry point for the backend API server. It resolves settings, bootstraps
//! the persistent store, assembles the HTTP router and starts the listener.
//! The Ollama availability check runs as a detached task once the listener
//! is bound.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hedgefund-server
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_HOST`: Server host (default: 0.0.0.0)
//! - `BACKEND_PORT`: Server port (default: 8000)
//! - `DATABASE_URL`: Store connection string (default: local SQLite file)
//! - `FRONTEND_ORIGIN`: Comma-separated extra CORS origins
//! - `PUBLIC_URL`: Public deployment URL, added to the CORS origins
//! - `FRONTEND_DIST_DIR`: Frontend build directory (default: frontend/dist)
//! - `OLLAMA_BASE_URL`: Ollama server to probe (default: http://localhost:11434)
//! - `RUST_LOG`: Log level (default: info)
//!
//! A `.env` file at the project root supplies any of the above without
//! overriding variables already present in the environment.

use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hedgefund_backend::config;
use hedgefund_backend::db::{self, Database};
use hedgefund_backend::http::{create_router, frontend, AppState};
use hedgefund_backend::services::ollama;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting Hedge Fund Backend Server");

    // Settings are resolved once and shared; malformed values abort here.
    let settings = config::try_init()?;

    // A broken store is fatal: no traffic is served against it.
    let database = Database::connect(settings).await?;
    database.ensure_schema().await?;
    info!(
        "Persistent store ready ({})",
        db::connection_string(settings)
    );

    let state = AppState::new(database);

    let dist_dir = frontend::resolve_dist_dir();
    match &dist_dir {
        Some(dir) => info!("Serving frontend build from {}", dir.display()),
        None => info!("No frontend build found, running in API-only mode"),
    }

    let app = create_router(state, settings, dist_dir.as_deref())?;

    let addr: SocketAddr =
        format!("{}:{}", settings.backend_host, settings.backend_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Fire-and-forget diagnostics; readiness never waits on the probe.
    ollama::spawn_startup_check();

    axum::serve(listener, app).await?;

    Ok(())
}
