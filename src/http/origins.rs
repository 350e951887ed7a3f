//! Cross-origin access policy.
//!
//! The allowed origin set is a pure function of [`Settings`], computed once
//! at startup: a fixed set of local development origins unioned with the
//! operator-configured `FRONTEND_ORIGIN` list and `PUBLIC_URL`.

use std::collections::BTreeSet;

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::config::Settings;

/// Compute the deduplicated set of allowed cross-origin callers.
///
/// Defaults cover the loopback frontend dev server on both schemes and both
/// hostname spellings. `frontend_origin` entries are comma-split and
/// whitespace-trimmed with empty segments dropped; `public_url` is added with
/// any trailing slash stripped. Comparison is exact-string, case-sensitive.
pub fn allowed_origins(settings: &Settings) -> BTreeSet<String> {
    let mut origins = BTreeSet::new();

    for scheme in ["http", "https"] {
        for host in ["localhost", "127.0.0.1"] {
            origins.insert(format!("{scheme}://{host}:{}", settings.frontend_port));
        }
    }

    if let Some(configured) = &settings.frontend_origin {
        origins.extend(
            configured
                .split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        );
    }

    if let Some(public_url) = &settings.public_url {
        let trimmed = public_url.trim_end_matches('/');
        if !trimmed.is_empty() {
            origins.insert(trimmed.to_string());
        }
    }

    origins
}

/// Build the CORS middleware for the computed origin set.
///
/// Credentials are allowed, so methods and headers mirror the request rather
/// than using a wildcard (wildcards are invalid alongside credentials).
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins(settings)
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
