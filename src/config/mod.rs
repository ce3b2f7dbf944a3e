//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`DEVMATE_API_KEY`, `DEVMATE_BASE_URL`,
//!    `DEVMATE_MODEL`, `DEVMATE_API_TIMEOUT_SECS`, `DEVMATE_STATE_DIR`)
//! 2. TOML file given via `--config`
//! 3. `./devmate.toml`
//! 4. `$XDG_CONFIG_HOME/devmate/devmate.toml` (platform config dir otherwise)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

mod defaults;
mod env;
mod resolve;
mod sources;
mod types;

pub use sources::config_root_dir;
pub use types::{ApiConfig, ApiProtocol, Config, DisplayConfig, LoadedConfig, WorkspaceConfig};
use types::FileConfig;

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        sources::read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let parsed: FileConfig = toml::from_str(&config_text)?;
    let mut config = resolve::resolve_config(parsed, &env_lookup, |path| {
        read_file(Path::new(path)).map_err(|e| {
            ConfigError::Invalid(format!("failed to read api.api_key_file `{path}`: {e}"))
        })
    })?;
    env::apply_runtime_env_overrides(&mut config, &env_lookup)?;
    Ok(LoadedConfig {
        config,
        source: source.label(),
    })
}

impl ApiConfig {
    /// Fail with setup guidance when no API key was resolved.
    pub fn require_api_key(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no API key configured; set {} or one of api.api_key / api.api_key_env / api.api_key_file in devmate.toml",
                env::ENV_API_KEY
            )));
        }
        Ok(())
    }
}
