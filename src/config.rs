//! Application settings sourced from environment variables with an optional
//! `.env` fallback layer.
//!
//! Resolution order per field: process environment variable (case-insensitive
//! key match) → `.env` file at a fixed path relative to the working directory
//! (the project root when launched conventionally; loaded once, never
//! overriding variables already present in the environment) → built-in
//! default. Unknown keys are ignored. Settings are constructed once per
//! process and cached.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Result type for settings resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error raised when a recognized environment variable holds a value that
/// cannot be parsed into its typed field. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable process configuration.
///
/// Every field is independently optional or defaulted; see the module docs
/// for the resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Comma-separated list of additional allowed CORS origins.
    pub frontend_origin: Option<String>,
    /// Publicly reachable URL of the deployment, added to the origin set.
    pub public_url: Option<String>,
    /// Bind host for the backend listener.
    pub backend_host: String,
    /// Bind port for the backend listener.
    pub backend_port: u16,
    /// Host of the frontend dev server (out of scope for this process).
    pub frontend_host: String,
    /// Port of the frontend dev server; also used for the default origin set.
    pub frontend_port: u16,
    /// Explicit store connection string; defaults to a local SQLite file.
    pub database_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frontend_origin: None,
            public_url: None,
            backend_host: "0.0.0.0".to_string(),
            backend_port: 8000,
            frontend_host: "0.0.0.0".to_string(),
            frontend_port: 5173,
            database_url: None,
        }
    }
}

impl Settings {
    /// Build settings from an arbitrary key-value iterator.
    ///
    /// Key matching is case-insensitive and unrecognized keys are ignored.
    /// This is the pure core of [`Settings::from_env`] and is what tests use
    /// so the suite never mutates the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_uppercase(), v.into()))
            .collect();

        let get = |key: &str| vars.get(key).cloned();

        let parse_port = |key: &'static str, default: u16| -> ConfigResult<u16> {
            match vars.get(key) {
                None => Ok(default),
                Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        key,
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                }),
            }
        };

        Ok(Self {
            frontend_origin: get("FRONTEND_ORIGIN"),
            public_url: get("PUBLIC_URL"),
            backend_host: get("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            backend_port: parse_port("BACKEND_PORT", 8000)?,
            frontend_host: get("FRONTEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            frontend_port: parse_port("FRONTEND_PORT", 5173)?,
            database_url: get("DATABASE_URL"),
        })
    }

    /// Build settings from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(std::env::vars())
    }
}

/// Global settings instance initialized once per process.
static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Fixed location of the optional env-file layer, relative to the working
/// directory. No ancestor search: the file is either here or skipped.
pub const ENV_FILE: &str = ".env";

/// Resolve process settings once and cache them for the process lifetime.
///
/// The [`ENV_FILE`] is loaded before the environment is read; variables
/// already set in the process environment win over file entries, and a
/// missing file is not an error. Repeated calls return the same reference
/// without re-reading the environment, including under concurrent first
/// access.
///
/// # Errors
/// Returns [`ConfigError`] if a recognized variable holds a malformed value.
pub fn try_init() -> ConfigResult<&'static Settings> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }

    dotenvy::from_path(ENV_FILE).ok();
    let settings = Settings::from_env()?;
    Ok(SETTINGS.get_or_init(|| settings))
}
