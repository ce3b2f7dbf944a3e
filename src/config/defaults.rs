//! Default configuration constants.

use super::ApiProtocol;

/// Default Gemini API root.
pub(super) const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Gemini model id.
pub(super) const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
/// Default OpenAI-compatible API root.
pub(super) const DEFAULT_COMPLETIONS_BASE_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI-compatible model id.
pub(super) const DEFAULT_COMPLETIONS_MODEL: &str = "gpt-4o-mini";
/// Bounded timeout for one model request.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
/// Local config file name, also used under the global config root.
pub(super) const CONFIG_FILE_NAME: &str = "devmate.toml";
/// Subdirectory of the platform config root.
pub(super) const CONFIG_DIR_NAME: &str = "devmate";

/// Base URL used when the config does not name one.
pub(super) fn default_base_url(protocol: ApiProtocol) -> &'static str {
    match protocol {
        ApiProtocol::Gemini => DEFAULT_GEMINI_BASE_URL,
        ApiProtocol::Completions => DEFAULT_COMPLETIONS_BASE_URL,
    }
}

/// Model id used when the config does not name one.
pub(super) fn default_model(protocol: ApiProtocol) -> &'static str {
    match protocol {
        ApiProtocol::Gemini => DEFAULT_GEMINI_MODEL,
        ApiProtocol::Completions => DEFAULT_COMPLETIONS_MODEL,
    }
}
