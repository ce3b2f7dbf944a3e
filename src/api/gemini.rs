//! `models/{model}:generateContent` protocol request helper.

use crate::api::{success_body, PromptRequest};
use crate::error::ApiError;
use crate::state::Role;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn build_body(request: &PromptRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: [Part {
                text: &request.system,
            }],
        },
        contents: request
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(wire_role(turn.role)),
                parts: [Part { text: &turn.text }],
            })
            .collect(),
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

/// Pull the first candidate's text out of a raw response body.
fn reply_text(body: &str) -> Result<String, ApiError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("generateContent body: {e}")))?;
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ApiError::InvalidResponse(format!(
            "prompt was blocked by the provider ({reason})"
        )));
    }
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ApiError::InvalidResponse(
            "generateContent returned no candidate text".to_string(),
        ));
    }
    Ok(text)
}

/// Send one `generateContent` request and return the reply text.
pub(crate) async fn request(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    request: &PromptRequest,
) -> Result<String, ApiError> {
    let url = format!("{base_url}/models/{model}:generateContent");
    let response = http
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&build_body(request))
        .send()
        .await?;
    reply_text(&success_body(response).await?)
}
