//! `DEVMATE_*` environment overrides, applied after file resolution.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_API_KEY: &str = "DEVMATE_API_KEY";
pub(super) const ENV_BASE_URL: &str = "DEVMATE_BASE_URL";
pub(super) const ENV_MODEL: &str = "DEVMATE_MODEL";
pub(super) const ENV_API_TIMEOUT_SECS: &str = "DEVMATE_API_TIMEOUT_SECS";
pub(super) const ENV_STATE_DIR: &str = "DEVMATE_STATE_DIR";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(key) = non_empty(env_lookup, ENV_API_KEY) {
        config.api.api_key = key;
    }
    if let Some(url) = non_empty(env_lookup, ENV_BASE_URL) {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(model) = non_empty(env_lookup, ENV_MODEL) {
        config.api.model = model;
    }
    if let Some(timeout) = non_empty(env_lookup, ENV_API_TIMEOUT_SECS) {
        // Zero would mean "no timeout" to reqwest; clamp to one second.
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_API_TIMEOUT_SECS} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        config.api.timeout_secs = parsed.max(1);
    }
    if let Some(dir) = non_empty(env_lookup, ENV_STATE_DIR) {
        config.workspace.state_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
