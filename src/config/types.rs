//! Configuration data model.
//!
//! `FileConfig` mirrors the TOML layout; `Config` is the resolved runtime view
//! with the API key looked up and defaults applied.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{default_base_url, default_model, DEFAULT_API_TIMEOUT_SECS};

/// Provider wire protocol for model requests.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiProtocol {
    /// Google `models/{model}:generateContent`.
    #[default]
    Gemini,
    /// OpenAI-compatible `/chat/completions`.
    Completions,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub workspace: WorkspaceConfig,
    pub display: DisplayConfig,
}

/// Resolved API connection settings used by the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub protocol: ApiProtocol,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let protocol = ApiProtocol::default();
        Self {
            protocol,
            base_url: default_base_url(protocol).to_string(),
            model: default_model(protocol).to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Where state documents and new projects live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding `project_config.json` and `milestones.json`.
    pub state_dir: PathBuf,
    /// Parent directory for `init_project`.
    pub projects_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            projects_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Config plus a label for where it came from (for diagnostics).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: String,
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileConfig {
    pub(super) api: FileApiConfig,
    pub(super) workspace: WorkspaceConfig,
    pub(super) display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileApiConfig {
    pub(super) protocol: ApiProtocol,
    pub(super) base_url: Option<String>,
    pub(super) model: Option<String>,
    pub(super) api_key: String,
    pub(super) api_key_env: Option<String>,
    pub(super) api_key_file: Option<String>,
    pub(super) timeout_secs: Option<u64>,
}
