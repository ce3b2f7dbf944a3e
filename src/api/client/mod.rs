//! API client orchestration for the model transports.
//!
//! - dispatch wiring is delegated to `transport`.
//! - retry policy logic is delegated to `retry`.

mod retry;
mod transport;

use super::{ModelClient, PromptRequest};
use crate::config::{ApiConfig, ApiProtocol};
use crate::error::ApiError;
use async_trait::async_trait;
use retry::RetryPolicy;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Client for the configured model API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    protocol: ApiProtocol,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client from resolved API configuration.
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_timeout(config, Duration::from_secs(config.timeout_secs.max(1)))
    }

    pub fn with_timeout(config: &ApiConfig, timeout: Duration) -> Self {
        Self::new_with_retry_policy(config, timeout, RetryPolicy::default())
    }

    fn new_with_retry_policy(
        config: &ApiConfig,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http: transport::build_http_client(timeout),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
            api_key: config.api_key.trim().to_string(),
            protocol: config.protocol,
            retry_policy,
        }
    }

    /// Send a prompt and return the model's raw reply text.
    pub async fn complete(&self, request: &PromptRequest) -> Result<String, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            debug!(attempt, protocol = ?self.protocol, model = %self.model, "sending model request");
            let result = transport::dispatch_request(
                &self.http,
                self.protocol,
                &self.base_url,
                &self.model,
                &self.api_key,
                request,
            )
            .await;
            match result {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if !self.retry_policy.should_retry(&err, attempt) {
                        return Err(transport::with_diagnostic_hints(self.protocol, err));
                    }
                    let delay = self.retry_policy.retry_delay_for(&err);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient model API failure, retrying"
                    );
                    attempt = attempt.saturating_add(1);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn complete(&self, request: &PromptRequest) -> Result<String, ApiError> {
        ApiClient::complete(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HistoryEntry;
    use crate::testsupport::json_http_response;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request() -> PromptRequest {
        PromptRequest {
            system: "reply with JSON".into(),
            turns: vec![HistoryEntry::user("hello")],
        }
    }

    fn api_for(addr: std::net::SocketAddr, protocol: ApiProtocol) -> ApiConfig {
        ApiConfig {
            protocol,
            base_url: format!("http://{addr}/"),
            model: "test-model".to_string(),
            api_key: "test-key".to_string(),
            ..ApiConfig::default()
        }
    }

    /// Serve `responses` in order, one connection each, returning what each
    /// request looked like.
    async fn serve(listener: TcpListener, responses: Vec<String>) -> Vec<String> {
        let mut seen = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf = [0u8; 8192];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            seen.push(String::from_utf8_lossy(&buf[..n]).into_owned());
            let _ = stream.write_all(response.as_bytes()).await;
        }
        seen
    }

    #[tokio::test]
    async fn api_client_respects_timeout_policy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&accepted);

        // Keep connections open without answering so the client times out.
        let _accept = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(stream);
            }
        });

        let client = ApiClient::new_with_retry_policy(
            &api_for(addr, ApiProtocol::Gemini),
            Duration::from_millis(50),
            RetryPolicy {
                max_attempts: 2,
                backoff: Duration::from_millis(1),
            },
        );
        let err = client.complete(&request()).await.expect_err("timeout expected");
        match err {
            ApiError::Http(inner) => assert!(inner.is_timeout(), "unexpected error: {inner}"),
            other => panic!("expected timeout Http error, got: {other}"),
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 2, "timeout should be retried once");
    }

    #[tokio::test]
    async fn api_client_retries_transient_429_with_retry_after() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let ok_body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"message\":\"done\"}"}]}}]}"#;
        let server = tokio::spawn(serve(
            listener,
            vec![
                json_http_response(
                    "429 Too Many Requests",
                    &["Retry-After: 1"],
                    r#"{"error":"rate"}"#,
                ),
                json_http_response("200 OK", &[], ok_body),
            ],
        ));

        let client = ApiClient::with_timeout(
            &api_for(addr, ApiProtocol::Gemini),
            Duration::from_secs(5),
        );
        let text = client.complete(&request()).await.expect("retry should recover");
        assert_eq!(text, "{\"message\":\"done\"}");

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(
            seen[0].starts_with("POST /models/test-model:generateContent"),
            "unexpected request line: {}",
            seen[0]
        );
        assert!(seen[0].to_ascii_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn completions_protocol_uses_bearer_auth() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"message\":\"hi\"}"}}]}"#;
        let server = tokio::spawn(serve(listener, vec![json_http_response("200 OK", &[], body)]));

        let client = ApiClient::with_timeout(
            &api_for(addr, ApiProtocol::Completions),
            Duration::from_secs(5),
        );
        assert_eq!(client.complete(&request()).await.unwrap(), "{\"message\":\"hi\"}");
        let seen = server.await.unwrap();
        assert!(seen[0].starts_with("POST /chat/completions"));
        assert!(seen[0]
            .to_ascii_lowercase()
            .contains("authorization: bearer test-key"));
    }

    #[tokio::test]
    async fn non_json_success_body_is_invalid_response_without_retry() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(
            listener,
            vec![json_http_response("200 OK", &[], "<html>oops</html>")],
        ));

        let client = ApiClient::with_timeout(
            &api_for(addr, ApiProtocol::Gemini),
            Duration::from_secs(5),
        );
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)), "got: {err}");
        assert_eq!(server.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried_and_carry_hint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(
            listener,
            vec![json_http_response("401 Unauthorized", &[], r#"{"error":"key"}"#)],
        ));

        let client = ApiClient::with_timeout(
            &api_for(addr, ApiProtocol::Gemini),
            Duration::from_secs(5),
        );
        let err = client.complete(&request()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert!(err.to_string().contains("Hint:"), "got: {err}");
        assert_eq!(server.await.unwrap().len(), 1);
    }
}
