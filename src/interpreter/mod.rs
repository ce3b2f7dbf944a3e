//! Turns user text plus conversation history into a reply or an action.
//!
//! The session only sees the [`Interpreter`] trait and its two outcomes.
//! [`ModelInterpreter`] is the production implementation backed by a
//! [`ModelClient`]; tests substitute scripted interpreters.

mod parse;
mod prompt;

pub use prompt::{corrective_prompt, system_prompt, GREETING_REQUEST};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::action::ActionDescriptor;
use crate::api::{ModelClient, PromptRequest};
use crate::error::InterpreterError;
use crate::state::HistoryEntry;

/// What the model wants to happen this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// Conversational text only.
    Reply(String),
    Action {
        message: String,
        action: ActionDescriptor,
        /// The model itself asked for confirmation.
        requires_approval: bool,
    },
}

impl Interpretation {
    pub fn message(&self) -> &str {
        match self {
            Self::Reply(text) => text,
            Self::Action { message, .. } => message,
        }
    }

    /// Mutating kinds always need approval; anything else only when flagged.
    pub fn needs_approval(&self) -> bool {
        match self {
            Self::Reply(_) => false,
            Self::Action {
                action,
                requires_approval,
                ..
            } => *requires_approval || action.kind().is_mutating(),
        }
    }
}

/// An interpretation plus the raw model text to keep in history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreted {
    pub outcome: Interpretation,
    pub transcript: String,
}

#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(
        &self,
        history: &[HistoryEntry],
        input: &str,
    ) -> Result<Interpreted, InterpreterError>;
}

/// Interpreter that asks a language model for a JSON envelope.
pub struct ModelInterpreter<C> {
    client: C,
    system: String,
}

impl<C: ModelClient> ModelInterpreter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            system: system_prompt(),
        }
    }
}

#[async_trait]
impl<C: ModelClient> Interpreter for ModelInterpreter<C> {
    async fn interpret(
        &self,
        history: &[HistoryEntry],
        input: &str,
    ) -> Result<Interpreted, InterpreterError> {
        let mut turns = history.to_vec();
        turns.push(HistoryEntry::user(input));
        let mut request = PromptRequest {
            system: self.system.clone(),
            turns,
        };

        let raw = self.client.complete(&request).await?;
        let reason = match parse::parse_reply(&raw) {
            Ok(outcome) => {
                debug!(approval = outcome.needs_approval(), "model reply decoded");
                return Ok(Interpreted {
                    outcome,
                    transcript: raw,
                });
            }
            Err(reason) => reason,
        };

        warn!(%reason, "model reply did not match the envelope, asking again");
        request.turns.push(HistoryEntry::model(raw));
        request
            .turns
            .push(HistoryEntry::user(corrective_prompt(&reason)));
        let raw = self.client.complete(&request).await?;
        let outcome = parse::parse_reply(&raw).map_err(InterpreterError::InvalidResponse)?;
        Ok(Interpreted {
            outcome,
            transcript: raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::state::Role;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every request.
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, ApiError>>>,
        seen: Mutex<Vec<PromptRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String, ApiError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(&self, request: &PromptRequest) -> Result<String, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::InvalidResponse("script exhausted".into())))
        }
    }

    #[tokio::test]
    async fn sends_history_then_input() {
        let interpreter = ModelInterpreter::new(ScriptedClient::new(vec![Ok(
            r#"{"message":"Hello!"}"#.into(),
        )]));
        let history = vec![HistoryEntry::user("earlier"), HistoryEntry::model("{}")];
        let got = interpreter.interpret(&history, "hi").await.unwrap();
        assert_eq!(got.outcome, Interpretation::Reply("Hello!".into()));
        assert_eq!(got.transcript, r#"{"message":"Hello!"}"#);

        let seen = interpreter.client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].system.contains("create_files"));
        assert_eq!(seen[0].turns.len(), 3);
        assert_eq!(seen[0].turns[2], HistoryEntry::user("hi"));
    }

    #[tokio::test]
    async fn bad_envelope_gets_one_corrective_retry() {
        let interpreter = ModelInterpreter::new(ScriptedClient::new(vec![
            Ok(r#"{"msg":"oops"}"#.into()),
            Ok(r#"{"message":"Listing.","action":{"command":"list_files","payload":{}}}"#.into()),
        ]));
        let got = interpreter.interpret(&[], "show files").await.unwrap();
        assert_eq!(
            got.outcome,
            Interpretation::Action {
                message: "Listing.".into(),
                action: ActionDescriptor::ListFiles { directory: None },
                requires_approval: false,
            }
        );
        assert!(!got.outcome.needs_approval());

        let seen = interpreter.client.seen.lock().unwrap();
        let retry = &seen[1].turns;
        assert_eq!(retry[retry.len() - 2].role, Role::Model);
        assert!(retry[retry.len() - 1]
            .text
            .starts_with("The previous response was not a valid JSON object."));
    }

    #[tokio::test]
    async fn second_bad_envelope_is_invalid_response() {
        let interpreter =
            ModelInterpreter::new(ScriptedClient::new(vec![Ok("[]".into()), Ok("[]".into())]));
        let err = interpreter.interpret(&[], "x").await.unwrap_err();
        assert!(matches!(err, InterpreterError::InvalidResponse(_)), "got: {err}");
        assert_eq!(interpreter.client.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn api_outage_is_unavailable() {
        let interpreter = ModelInterpreter::new(ScriptedClient::new(vec![Err(ApiError::status(
            503,
            "down".into(),
            None,
        ))]));
        let err = interpreter.interpret(&[], "x").await.unwrap_err();
        assert!(matches!(err, InterpreterError::Unavailable(_)), "got: {err}");
    }

    #[test]
    fn mutating_actions_need_approval_even_unflagged() {
        let action = Interpretation::Action {
            message: String::new(),
            action: ActionDescriptor::InitProject { name: "x".into() },
            requires_approval: false,
        };
        assert!(action.needs_approval());
        let flagged_list = Interpretation::Action {
            message: String::new(),
            action: ActionDescriptor::ListFiles { directory: None },
            requires_approval: true,
        };
        assert!(flagged_list.needs_approval());
        assert!(!Interpretation::Reply("hi".into()).needs_approval());
    }
}
