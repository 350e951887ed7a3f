//! Ollama availability probe run once at startup.
//!
//! The probe is strictly diagnostic: it runs as a detached task after the
//! listener is ready, logs what it finds and never affects readiness. An
//! unreachable or slow server is reported as "not running", bounded by the
//! client timeout.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

/// Default Ollama server location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Upper bound on the status query; a timeout means "not running".
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Snapshot of the local Ollama installation. Ephemeral, only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaStatus {
    pub installed: bool,
    pub running: bool,
    pub server_url: String,
    pub available_models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for the Ollama status endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Build a client for the server at `OLLAMA_BASE_URL`, or the default.
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Build a client for an explicit server URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(STATUS_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Query installation and running state plus the downloaded models.
    ///
    /// An unreachable or unresponsive server is not an error: it reports
    /// `running: false`, with `installed` decided by a `PATH` scan for the
    /// binary. Only unexpected failures (e.g. a malformed response body)
    /// surface as errors, for the caller to downgrade to a warning.
    pub async fn check_status(&self) -> Result<OllamaStatus, reqwest::Error> {
        let tags_url = format!("{}/api/tags", self.base_url);

        match self.http.get(&tags_url).send().await {
            Ok(response) => {
                let tags: TagsResponse = response.error_for_status()?.json().await?;
                Ok(OllamaStatus {
                    installed: true,
                    running: true,
                    server_url: self.base_url.clone(),
                    available_models: tags.models.into_iter().map(|m| m.name).collect(),
                })
            }
            Err(e) if e.is_connect() || e.is_timeout() => Ok(OllamaStatus {
                installed: binary_on_path(),
                running: false,
                server_url: self.base_url.clone(),
                available_models: Vec::new(),
            }),
            Err(e) => Err(e),
        }
    }
}

/// Whether an `ollama` executable is reachable through `PATH`.
fn binary_on_path() -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| {
        let candidate = dir.join("ollama");
        candidate.is_file() || candidate.with_extension("exe").is_file()
    })
}

/// Run the availability check as a detached background task.
///
/// Spawned after the listener is bound; startup never waits on it and every
/// failure is caught and logged inside the task.
pub fn spawn_startup_check() -> tokio::task::JoinHandle<()> {
    tokio::spawn(async {
        info!("Checking Ollama availability...");

        let client = match OllamaClient::from_env() {
            Ok(client) => client,
            Err(e) => {
                warn!("Could not build Ollama probe client: {}", e);
                return;
            }
        };

        match client.check_status().await {
            Ok(status) => log_status(&status),
            Err(e) => {
                warn!("Could not check Ollama status: {}", e);
                info!("Ollama integration is available if you install it later");
            }
        }
    })
}

fn log_status(status: &OllamaStatus) {
    if status.installed {
        if status.running {
            info!(
                "Ollama is installed and running at {}",
                status.server_url
            );
            if status.available_models.is_empty() {
                info!("No models are currently downloaded");
            } else {
                info!(
                    "Available models: {}",
                    status.available_models.join(", ")
                );
            }
        } else {
            info!("Ollama is installed but not running");
            info!("You can start it from the Settings page or manually with 'ollama serve'");
        }
    } else {
        info!("Ollama is not installed. Install it to use local models.");
        info!("Visit https://ollama.com to download and install Ollama");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_reports_not_running() {
        // Nothing listens on port 1; the probe must resolve quickly instead
        // of erroring or hanging.
        let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
        let status = client.check_status().await.unwrap();
        assert!(!status.running);
        assert!(status.available_models.is_empty());
        assert_eq!(status.server_url, "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_startup_check_task_never_panics() {
        let handle = spawn_startup_check();
        handle.await.expect("diagnostics task must not panic");
    }

    #[test]
    fn test_tags_payload_shape() {
        let tags: TagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"llama3"},{"name":"qwen2"}]}"#).unwrap();
        let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3", "qwen2"]);
    }

    #[test]
    fn test_tags_payload_tolerates_missing_models() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }
}
