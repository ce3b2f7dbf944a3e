//! Error types shared across the assistant.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status {
        code: u16,
        body: String,
        retry_after_secs: Option<u64>,
    },
    /// 2xx reply whose body did not have the expected shape.
    InvalidResponse(String),
}

impl ApiError {
    pub fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        Self::Status {
            code,
            body,
            retry_after_secs,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Status {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }

    /// Timeouts, connection failures, rate limits and server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(inner) => inner.is_timeout() || inner.is_connect(),
            Self::Status { code, .. } => *code == 429 || (500..=599).contains(code),
            Self::InvalidResponse(_) => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status { code, body, .. } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// StateError
// ---------------------------------------------------------------------------

/// Errors reading or writing the persisted state documents.
#[derive(Debug)]
pub enum StateError {
    /// Filesystem failure (permissions, disk full, ...).
    Io { path: PathBuf, source: std::io::Error },
    /// The file exists but does not hold a state document we can read.
    Corrupt { path: PathBuf, reason: String },
}

impl StateError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Everything except a permission failure leaves the session usable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() != std::io::ErrorKind::PermissionDenied,
            Self::Corrupt { .. } => true,
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Corrupt { path, reason } => {
                write!(f, "corrupt state file {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for StateError {}

// ---------------------------------------------------------------------------
// ActionError
// ---------------------------------------------------------------------------

/// Failures that abort a single action. None of these end the session except
/// `Io`/`State`, which the caller may choose to propagate.
#[derive(Debug)]
pub enum ActionError {
    /// `init_project` target already exists.
    AlreadyExists(PathBuf),
    /// The action needs a project root and none is set.
    NoProject,
    /// The descriptor carried an unusable value (bad name, bad path).
    InvalidInput(String),
    Io { path: PathBuf, source: std::io::Error },
    State(StateError),
}

impl ActionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors the user can fix by asking for something else.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::AlreadyExists(_) | Self::NoProject | Self::InvalidInput(_) => true,
            Self::Io { source, .. } => source.kind() != std::io::ErrorKind::PermissionDenied,
            Self::State(e) => e.is_recoverable(),
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists(path) => write!(f, "{} already exists", path.display()),
            Self::NoProject => write!(
                f,
                "no project is active; ask me to initialize one first (init_project)"
            ),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::State(e) => write!(f, "state: {e}"),
        }
    }
}

impl std::error::Error for ActionError {}

impl From<StateError> for ActionError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

// ---------------------------------------------------------------------------
// InterpreterError
// ---------------------------------------------------------------------------

/// Errors from turning user text into a reply or an action.
#[derive(Debug)]
pub enum InterpreterError {
    /// The model API could not be reached after the retry budget.
    Unavailable(ApiError),
    /// The model answered, but not in the structured envelope we asked for.
    InvalidResponse(String),
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "model unavailable: {e}"),
            Self::InvalidResponse(msg) => write!(f, "unusable model reply: {msg}"),
        }
    }
}

impl std::error::Error for InterpreterError {}

impl From<ApiError> for InterpreterError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::InvalidResponse(msg) => Self::InvalidResponse(msg),
            other => Self::Unavailable(other),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Failures that end the interactive session.
#[derive(Debug)]
pub enum SessionError {
    State(StateError),
    Action(ActionError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(e) => write!(f, "state: {e}"),
            Self::Action(e) => write!(f, "action failed: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<StateError> for SessionError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<ActionError> for SessionError {
    fn from(e: ActionError) -> Self {
        Self::Action(e)
    }
}
