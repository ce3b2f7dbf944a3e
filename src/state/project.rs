//! The active project and its conversation transcript.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Who said a line of the conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Model,
}

/// One line of conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Durable session context: which directory is the project, and what has
/// been said so far. Threaded explicitly through the session and executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub project_root: Option<PathBuf>,
    pub conversation_history: Vec<HistoryEntry>,
}

impl ProjectConfig {
    /// Append one completed exchange.
    pub fn record_exchange(&mut self, user_text: impl Into<String>, model_text: impl Into<String>) {
        self.conversation_history.push(HistoryEntry::user(user_text));
        self.conversation_history.push(HistoryEntry::model(model_text));
    }

    /// Display name of the project directory, if any.
    pub fn project_name(&self) -> Option<String> {
        let root = self.project_root.as_ref()?;
        Some(
            root.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string()),
        )
    }
}
