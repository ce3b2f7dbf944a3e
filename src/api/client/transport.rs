//! HTTP transport helpers for protocol-specific API requests.

use crate::api::{completions, gemini, PromptRequest};
use crate::config::ApiProtocol;
use crate::error::ApiError;
use std::time::Duration;

/// Build an HTTP client with timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Dispatch one API request for the configured wire protocol.
pub(super) async fn dispatch_request(
    http: &reqwest::Client,
    protocol: ApiProtocol,
    base_url: &str,
    model: &str,
    api_key: &str,
    request: &PromptRequest,
) -> Result<String, ApiError> {
    match protocol {
        ApiProtocol::Gemini => gemini::request(http, base_url, model, api_key, request).await,
        ApiProtocol::Completions => {
            completions::request(http, base_url, model, api_key, request).await
        }
    }
}

/// Append a config hint to status errors a user can usually fix locally.
pub(super) fn with_diagnostic_hints(protocol: ApiProtocol, err: ApiError) -> ApiError {
    let ApiError::Status {
        code,
        mut body,
        retry_after_secs,
    } = err
    else {
        return err;
    };

    match code {
        401 | 403 => body.push_str(
            "\nHint: check the API key (`DEVMATE_API_KEY` or `[api] api_key_env` in devmate.toml).",
        ),
        404 if protocol == ApiProtocol::Gemini => body.push_str(
            "\nHint: the model name may be wrong, or this endpoint may expect `protocol = \"completions\"`.",
        ),
        404 => body.push_str(
            "\nHint: this endpoint may not support `/chat/completions`; set `protocol = \"gemini\"` or fix `base_url`.",
        ),
        _ => {}
    }
    ApiError::status(code, body, retry_after_secs)
}
