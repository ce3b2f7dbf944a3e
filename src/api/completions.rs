//! `/chat/completions` protocol request helper.

use crate::api::{success_body, PromptRequest};
use crate::error::ApiError;
use crate::state::Role;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_body<'a>(model: &'a str, request: &'a PromptRequest) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    messages.push(ChatMessage {
        role: "system",
        content: &request.system,
    });
    messages.extend(request.turns.iter().map(|turn| ChatMessage {
        role: match turn.role {
            Role::User => "user",
            Role::Model => "assistant",
        },
        content: &turn.text,
    }));
    ChatRequest {
        model,
        messages,
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

fn reply_text(body: &str) -> Result<String, ApiError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("chat completion body: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidResponse("chat completion had no content".to_string()))
}

/// Send one `/chat/completions` request and return the reply text.
pub(crate) async fn request(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    request: &PromptRequest,
) -> Result<String, ApiError> {
    let url = format!("{base_url}/chat/completions");
    let mut req = http.post(&url).json(&build_body(model, request));
    if !api_key.trim().is_empty() {
        req = req.bearer_auth(api_key.trim());
    }
    let response = req.send().await?;
    reply_text(&success_body(response).await?)
}
