//! HTTP client for the language-model backends.
//!
//! The API layer is split into protocol modules:
//! - `gemini`: `models/{model}:generateContent`
//! - `completions`: OpenAI-compatible `/chat/completions`
//! - `client`: retry and dispatch orchestration
//!
//! Both protocols ask for a JSON reply and hand back the raw reply text; the
//! interpreter owns decoding it.

use crate::error::ApiError;
use crate::state::HistoryEntry;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::SystemTime;

mod client;
mod completions;
mod gemini;

pub use client::ApiClient;

/// One model call: the fixed instruction plus the transcript so far, ending
/// with the newest user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub system: String,
    pub turns: Vec<HistoryEntry>,
}

/// Minimal model API interface used by the interpreter.
///
/// Tests provide scripted replies through this trait; the production path
/// uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &PromptRequest) -> Result<String, ApiError>;
}

/// Read `Retry-After` as either delta-seconds or an HTTP date.
pub(crate) fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let at = httpdate::parse_http_date(raw).ok()?;
    Some(
        at.duration_since(SystemTime::now())
            .map(|d| d.as_secs())
            .unwrap_or(0),
    )
}

/// Turn a non-2xx reply into [`ApiError::Status`], otherwise return the body.
pub(crate) async fn success_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let retry_after_secs = parse_retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::status(status.as_u16(), body, retry_after_secs));
    }
    Ok(response.text().await?)
}
