//! Decoding of model reply text into an [`Interpretation`].

use serde::Deserialize;
use serde_json::Value;

use super::Interpretation;
use crate::action::ActionDescriptor;

#[derive(Deserialize)]
struct Envelope {
    message: String,
    #[serde(default)]
    requires_approval: bool,
    #[serde(default)]
    action: Option<WireAction>,
}

#[derive(Deserialize)]
struct WireAction {
    command: String,
    #[serde(default)]
    payload: Value,
}

/// Remove a surrounding Markdown code fence (with optional language tag).
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Decode one reply.
///
/// Text that is not JSON at all is treated as conversation. JSON that does
/// not fit the envelope is an error the caller may send back to the model.
pub(crate) fn parse_reply(raw: &str) -> Result<Interpretation, String> {
    let text = strip_code_fence(raw);
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Ok(Interpretation::Reply(text.to_string())),
    };
    if !value.is_object() {
        return Err("expected a JSON object at the top level".to_string());
    }
    let envelope: Envelope = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let Some(action) = envelope.action else {
        return Ok(Interpretation::Reply(envelope.message));
    };
    match ActionDescriptor::from_command(action.command.trim(), action.payload)? {
        None => Ok(Interpretation::Reply(envelope.message)),
        Some(descriptor) => Ok(Interpretation::Action {
            message: envelope.message,
            action: descriptor,
            requires_approval: envelope.requires_approval,
        }),
    }
}
