//! Slash commands handled locally without a model call.

/// A parsed `/command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    Help,
    Status,
    Milestones,
    /// `/project <path>`; `None` when the path was left off.
    Project(Option<String>),
    Unknown(String),
}

impl LocalCommand {
    /// Parse a line starting with `/`. Returns `None` for ordinary input.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let arg = (!arg.is_empty()).then(|| arg.to_string());
        Some(match name.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "status" => Self::Status,
            "milestones" => Self::Milestones,
            "project" => Self::Project(arg),
            _ => Self::Unknown(name.to_string()),
        })
    }
}

pub const HELP_ROWS: [(&str, &str); 5] = [
    ("/help", "show this list"),
    ("/status", "project root, history length and milestone count"),
    ("/milestones", "list tracked milestones"),
    ("/project <path>", "switch to an existing project directory"),
    ("exit | quit", "end the session"),
];

/// Case-insensitive `exit`/`quit`.
pub fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands_and_arguments() {
        assert_eq!(LocalCommand::parse("/help"), Some(LocalCommand::Help));
        assert_eq!(LocalCommand::parse(" /STATUS "), Some(LocalCommand::Status));
        assert_eq!(
            LocalCommand::parse("/project  ~/code/my app "),
            Some(LocalCommand::Project(Some("~/code/my app".into())))
        );
        assert_eq!(LocalCommand::parse("/project"), Some(LocalCommand::Project(None)));
        assert_eq!(
            LocalCommand::parse("/deploy now"),
            Some(LocalCommand::Unknown("deploy".into()))
        );
        assert_eq!(LocalCommand::parse("make a project"), None);
    }

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit("exit"));
        assert!(is_exit("  QUIT "));
        assert!(!is_exit("exit now"));
    }
}
