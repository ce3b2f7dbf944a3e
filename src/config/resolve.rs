//! Turn a parsed `FileConfig` into a runtime `Config`.

use crate::error::ConfigError;

use super::defaults::{default_base_url, default_model, DEFAULT_API_TIMEOUT_SECS};
use super::types::{ApiConfig, Config, FileApiConfig, FileConfig};

pub(super) fn resolve_config<FEnv, FRead>(
    parsed: FileConfig,
    env_lookup: &FEnv,
    read_file: FRead,
) -> Result<Config, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
    FRead: Fn(&str) -> Result<String, ConfigError>,
{
    let api_key = resolve_api_key(&parsed.api, env_lookup, read_file)?;
    let protocol = parsed.api.protocol;
    let api = ApiConfig {
        protocol,
        base_url: normalized_option(&parsed.api.base_url)
            .unwrap_or_else(|| default_base_url(protocol).to_string())
            .trim_end_matches('/')
            .to_string(),
        model: normalized_option(&parsed.api.model)
            .unwrap_or_else(|| default_model(protocol).to_string()),
        api_key,
        timeout_secs: parsed
            .api
            .timeout_secs
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS)
            .max(1),
    };
    Ok(Config {
        api,
        workspace: parsed.workspace,
        display: parsed.display,
    })
}

pub(super) fn resolve_api_key<FEnv, FRead>(
    api: &FileApiConfig,
    env_lookup: &FEnv,
    read_file: FRead,
) -> Result<String, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
    FRead: Fn(&str) -> Result<String, ConfigError>,
{
    validate_api_key_sources(api)?;

    if let Some(env_name) = normalized_option(&api.api_key_env) {
        return Ok(env_lookup(&env_name).unwrap_or_default().trim().to_string());
    }
    if let Some(path) = normalized_option(&api.api_key_file) {
        return Ok(read_file(&path)?.trim().to_string());
    }
    Ok(api.api_key.trim().to_string())
}

fn validate_api_key_sources(api: &FileApiConfig) -> Result<(), ConfigError> {
    let mut configured = Vec::new();
    if normalized_string(&api.api_key).is_some() {
        configured.push("api_key");
    }
    if normalized_option(&api.api_key_env).is_some() {
        configured.push("api_key_env");
    }
    if normalized_option(&api.api_key_file).is_some() {
        configured.push("api_key_file");
    }
    if configured.len() > 1 {
        return Err(ConfigError::Invalid(format!(
            "only one of api.api_key, api.api_key_env, and api.api_key_file may be set (found: {})",
            configured.join(", ")
        )));
    }
    Ok(())
}

pub(super) fn normalized_option(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(normalized_string)
}

pub(super) fn normalized_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
