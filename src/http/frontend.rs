//! Static frontend serving with SPA fallback routing.
//!
//! Activates only when a frontend build directory exists on disk; otherwise
//! the component registers nothing. Routing priority when active:
//!
//! 1. `/assets/*` served byte-for-byte from `<dist>/assets` (missing file is
//!    a plain 404, never the SPA shell)
//! 2. `/` serves `<dist>/index.html`
//! 3. unmatched paths under the API prefix stay 404, so real API 404s are
//!    never masked as HTML
//! 4. every other unmatched path serves the SPA shell and the client-side
//!    router takes over

use std::path::{Path, PathBuf};

use axum::{
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

/// Default build-output location, relative to the working directory.
pub const DEFAULT_DIST_DIR: &str = "frontend/dist";

/// Startup misconfiguration of the frontend build directory.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// A build directory exists but its assets subdirectory does not. This
    /// fails loudly at startup instead of silently degrading.
    #[error("frontend build at {dist} has no assets directory ({assets})")]
    MissingAssets { dist: PathBuf, assets: PathBuf },
}

/// Resolve the frontend build directory, if one exists on disk.
///
/// `FRONTEND_DIST_DIR` overrides the default relative location. `None` means
/// the static frontend is inert and the process runs API-only.
pub fn resolve_dist_dir() -> Option<PathBuf> {
    let dist = std::env::var("FRONTEND_DIST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DIST_DIR));
    dist.is_dir().then_some(dist)
}

/// Build the router serving the frontend bundle rooted at `dist`.
pub fn frontend_router<S>(dist: &Path) -> Result<Router<S>, FrontendError>
where
    S: Clone + Send + Sync + 'static,
{
    let assets = dist.join("assets");
    if !assets.is_dir() {
        return Err(FrontendError::MissingAssets {
            dist: dist.to_path_buf(),
            assets,
        });
    }
    let index = dist.join("index.html");
    let spa_index = index.clone();

    Ok(Router::new()
        .nest_service("/assets", ServeDir::new(assets))
        .route_service("/", ServeFile::new(index))
        .fallback(move |uri: Uri| spa_fallback(uri, spa_index.clone())))
}

/// Catch-all for paths the domain router and asset mount did not claim.
async fn spa_fallback(uri: Uri, index: PathBuf) -> Response {
    // Unmatched API routes surface their 404 instead of the SPA shell. The
    // guard is a literal prefix match on "api/", matching the mount prefix.
    if uri.path().trim_start_matches('/').starts_with("api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(&index).await {
        Ok(bytes) => Html(bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_assets_dir_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        let err = frontend_router::<()>(dir.path()).unwrap_err();
        match err {
            FrontendError::MissingAssets { dist, assets } => {
                assert_eq!(dist, dir.path());
                assert_eq!(assets, dir.path().join("assets"));
            }
        }
    }

    #[test]
    fn test_router_builds_when_assets_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        assert!(frontend_router::<()>(dir.path()).is_ok());
    }
}
