//! Interactive session loop.
//!
//! One turn: read a line, interpret it, show the reply, and for actions run
//! the approval gate and then the executor. History is written through to the
//! state store after every exchange, so a crash loses at most the turn in
//! flight.

mod commands;

pub use commands::{is_exit, LocalCommand};

use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::action::ActionDescriptor;
use crate::approval::{self, DECLINE_NOTE};
use crate::error::{ActionError, SessionError, StateError};
use crate::executor::Executor;
use crate::interpreter::{Interpretation, Interpreter, GREETING_REQUEST};
use crate::state::{HistoryEntry, MilestoneSet, ProjectConfig};
use crate::ui::RenderSink;

pub const INPUT_PROMPT: &str = "You: ";
pub const PROJECT_NAME_PROMPT: &str = "What's the name of the new project? ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    AwaitingApproval,
    Exiting,
}

pub struct Session<I, R, S> {
    interpreter: I,
    executor: Executor,
    input: R,
    renderer: S,
    config: ProjectConfig,
    state: SessionState,
}

impl<I, R, S> Session<I, R, S>
where
    I: Interpreter,
    R: BufRead,
    S: RenderSink,
{
    pub fn new(interpreter: I, executor: Executor, input: R, renderer: S) -> Self {
        Self {
            interpreter,
            executor,
            input,
            renderer,
            config: ProjectConfig::default(),
            state: SessionState::AwaitingInput,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Load state, then greet or print the resume banner.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        let store = self.executor.store().clone();
        self.config = match store.load() {
            Ok(Some(config)) => config,
            Ok(None) => ProjectConfig::default(),
            Err(e) if e.is_corrupt() => {
                self.quarantine(&e, store.config_path())?;
                ProjectConfig::default()
            }
            Err(e) => {
                self.report_state_error(e)?;
                ProjectConfig::default()
            }
        };
        match store.load_milestones() {
            Ok(_) => {}
            Err(e) if e.is_corrupt() => self.quarantine(&e, store.milestones_path())?,
            Err(e) => self.report_state_error(e)?,
        }

        if self.config.conversation_history.is_empty() {
            self.renderer
                .detail("Welcome to devmate! Type /help for commands, 'exit' to quit.");
            self.greet().await?;
        } else {
            if let Some(root) = &self.config.project_root {
                self.renderer
                    .detail(&format!("Current project: {}", root.display()));
            }
            self.renderer.detail(&format!(
                "Resuming previous conversation ({} entries).",
                self.config.conversation_history.len()
            ));
        }
        Ok(())
    }

    /// Run until `exit`, `quit` or end of input.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        self.start().await?;
        while self.state != SessionState::Exiting {
            self.renderer.prompt(INPUT_PROMPT);
            match approval::read_line(&mut self.input) {
                Some(line) => self.run_turn(&line).await?,
                None => self.state = SessionState::Exiting,
            }
        }
        self.renderer.detail("Goodbye!");
        Ok(())
    }

    /// Handle one line of user input.
    pub async fn run_turn(&mut self, line: &str) -> Result<(), SessionError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        if is_exit(line) {
            self.state = SessionState::Exiting;
            return Ok(());
        }
        if let Some(command) = LocalCommand::parse(line) {
            return self.run_local(command);
        }

        let interpreted = match self
            .interpreter
            .interpret(&self.config.conversation_history, line)
            .await
        {
            Ok(interpreted) => interpreted,
            Err(e) => {
                warn!(error = %e, "interpretation failed");
                self.renderer
                    .error(&format!("Sorry, I could not process that: {e}"));
                return Ok(());
            }
        };

        let message = interpreted.outcome.message();
        if !message.trim().is_empty() {
            self.renderer.assistant_message(message);
        }
        let saved = self.commit_history(|config| {
            config.record_exchange(line, interpreted.transcript.as_str())
        })?;
        if !saved {
            return Ok(());
        }

        let needs_approval = interpreted.outcome.needs_approval();
        match interpreted.outcome {
            Interpretation::Reply(_) => Ok(()),
            Interpretation::Action { action, .. } => self.handle_action(action, needs_approval),
        }
    }

    fn handle_action(
        &mut self,
        mut action: ActionDescriptor,
        needs_approval: bool,
    ) -> Result<(), SessionError> {
        if let ActionDescriptor::InitProject { name } = &mut action {
            if name.trim().is_empty() {
                self.renderer.prompt(PROJECT_NAME_PROMPT);
                match approval::read_line(&mut self.input).map(|n| n.trim().to_string()) {
                    Some(given) if !given.is_empty() => *name = given,
                    _ => {
                        self.renderer
                            .warn("No project name given; nothing was created.");
                        return Ok(());
                    }
                }
            }
        }

        if needs_approval {
            self.state = SessionState::AwaitingApproval;
            let description = self.executor.describe(&action, &self.config);
            let approved = approval::confirm(&mut self.input, &self.renderer, &description);
            self.state = SessionState::AwaitingInput;
            if !approved {
                info!(kind = %action.kind(), "action declined");
                self.renderer
                    .detail("Action cancelled. Please provide new instructions.");
                self.commit_history(|config| {
                    config
                        .conversation_history
                        .push(HistoryEntry::user(DECLINE_NOTE))
                })?;
                return Ok(());
            }
        }

        match self.executor.execute(&action, &mut self.config) {
            Ok(report) => {
                self.renderer.section(&report.summary);
                for line in &report.lines {
                    self.renderer.detail(line);
                }
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                self.renderer.error(&e.to_string());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn run_local(&mut self, command: LocalCommand) -> Result<(), SessionError> {
        debug!(?command, "local command");
        match command {
            LocalCommand::Help => {
                self.renderer.section("Commands");
                for (usage, what) in commands::HELP_ROWS {
                    self.renderer.field(usage, what);
                }
            }
            LocalCommand::Status => {
                let milestones = self.load_milestones_for_display();
                self.renderer.section("Status");
                let root = self
                    .config
                    .project_root
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                self.renderer.field("project root", &root);
                self.renderer.field(
                    "history entries",
                    &self.config.conversation_history.len().to_string(),
                );
                self.renderer.field(
                    "milestones",
                    &milestones.map(|m| m.len().to_string()).unwrap_or_else(|| "?".into()),
                );
                self.renderer.field(
                    "state dir",
                    &self.executor.store().dir().display().to_string(),
                );
            }
            LocalCommand::Milestones => {
                let Some(milestones) = self.load_milestones_for_display() else {
                    return Ok(());
                };
                self.renderer.section("Milestones");
                if milestones.is_empty() {
                    self.renderer.detail("No milestones yet.");
                }
                for m in milestones.iter() {
                    match &m.notes {
                        Some(notes) => self
                            .renderer
                            .detail(&format!("{}: {} ({notes})", m.name, m.status)),
                        None => self.renderer.detail(&format!("{}: {}", m.name, m.status)),
                    }
                }
            }
            LocalCommand::Project(None) => self.renderer.warn("Usage: /project <path>"),
            LocalCommand::Project(Some(path)) => self.switch_project(&path)?,
            LocalCommand::Unknown(name) => self
                .renderer
                .warn(&format!("Unknown command /{name}. Type /help for the list.")),
        }
        Ok(())
    }

    fn switch_project(&mut self, raw: &str) -> Result<(), SessionError> {
        let path = expand_home(raw);
        let root = match fs::canonicalize(&path) {
            Ok(root) if root.is_dir() => root,
            Ok(_) => {
                self.renderer
                    .error(&format!("{} is not a directory", path.display()));
                return Ok(());
            }
            Err(e) => {
                self.renderer.error(&format!("{}: {e}", path.display()));
                return Ok(());
            }
        };
        let mut next = self.config.clone();
        next.project_root = Some(root.clone());
        if let Err(e) = self.executor.store().save(&next) {
            return self.report_state_error(e);
        }
        self.config = next;
        info!(root = %root.display(), "switched project root");
        self.renderer
            .detail(&format!("Switched project root to: {}", root.display()));
        Ok(())
    }

    async fn greet(&mut self) -> Result<(), SessionError> {
        match self.interpreter.interpret(&[], GREETING_REQUEST).await {
            Ok(greeting) => {
                self.renderer.assistant_message(greeting.outcome.message());
                self.commit_history(|config| {
                    config.record_exchange(GREETING_REQUEST, greeting.transcript.as_str())
                })?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "greeting failed");
                self.renderer
                    .warn(&format!("Could not reach the assistant yet: {e}"));
                Ok(())
            }
        }
    }

    /// Apply `update` to a copy of the config and persist it before adopting it.
    ///
    /// Returns `false` when the save failed recoverably; memory then still
    /// matches disk and the caller abandons the turn.
    fn commit_history(
        &mut self,
        update: impl FnOnce(&mut ProjectConfig),
    ) -> Result<bool, SessionError> {
        let mut next = self.config.clone();
        update(&mut next);
        if let Err(e) = self.executor.store().save(&next) {
            self.report_state_error(e)?;
            return Ok(false);
        }
        self.config = next;
        Ok(true)
    }

    fn quarantine(&self, err: &StateError, path: PathBuf) -> Result<(), SessionError> {
        self.renderer
            .warn(&format!("{err}; starting with defaults."));
        match self.executor.store().quarantine(&path) {
            Ok(moved) => self
                .renderer
                .detail(&format!("The unreadable file was moved to {}", moved.display())),
            Err(e) => self.report_state_error(e)?,
        }
        Ok(())
    }

    /// Show a state failure; only permission errors end the session.
    fn report_state_error(&self, err: StateError) -> Result<(), SessionError> {
        if !err.is_recoverable() {
            return Err(err.into());
        }
        warn!(error = %err, "state file access failed");
        self.renderer
            .error(&format!("Could not access session state: {err}"));
        Ok(())
    }

    fn load_milestones_for_display(&self) -> Option<MilestoneSet> {
        match self.executor.store().load_milestones() {
            Ok(set) => Some(set),
            Err(e) => {
                self.renderer
                    .error(&ActionError::State(e).to_string());
                None
            }
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterpreterError;
    use crate::interpreter::Interpreted;
    use crate::state::StateStore;
    use crate::testsupport::{RecordingSink, TestTempDir};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Returns queued outcomes in order; an empty queue yields a plain reply.
    #[derive(Default)]
    struct ScriptedInterpreter {
        outcomes: Mutex<VecDeque<Result<Interpretation, String>>>,
        inputs: Mutex<Vec<String>>,
    }

    impl ScriptedInterpreter {
        fn new(outcomes: Vec<Result<Interpretation, String>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                inputs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Interpreter for ScriptedInterpreter {
        async fn interpret(
            &self,
            _history: &[HistoryEntry],
            input: &str,
        ) -> Result<Interpreted, InterpreterError> {
            self.inputs.lock().unwrap().push(input.to_string());
            let next = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Interpretation::Reply("ok".into())));
            match next {
                Ok(outcome) => Ok(Interpreted {
                    transcript: format!("{{\"message\":{:?}}}", outcome.message()),
                    outcome,
                }),
                Err(msg) => Err(InterpreterError::InvalidResponse(msg)),
            }
        }
    }

    struct Harness {
        fixture: TestTempDir,
        sink: RecordingSink,
    }

    impl Harness {
        fn new(prefix: &str) -> Self {
            Self {
                fixture: TestTempDir::new(prefix),
                sink: RecordingSink::default(),
            }
        }

        fn store(&self) -> StateStore {
            StateStore::open(self.fixture.child("state")).unwrap()
        }

        fn session(
            &self,
            script: Vec<Result<Interpretation, String>>,
            input: &str,
        ) -> Session<ScriptedInterpreter, Cursor<Vec<u8>>, RecordingSink> {
            Session::new(
                ScriptedInterpreter::new(script),
                Executor::new(self.store(), self.fixture.child("projects")),
                Cursor::new(input.as_bytes().to_vec()),
                self.sink.clone(),
            )
        }
    }

    fn action(action: ActionDescriptor) -> Result<Interpretation, String> {
        Ok(Interpretation::Action {
            message: "On it.".into(),
            action,
            requires_approval: true,
        })
    }

    #[tokio::test]
    async fn fresh_start_greets_and_persists_exchange() {
        let h = Harness::new("session-greet");
        let mut session = h.session(vec![Ok(Interpretation::Reply("Hello there!".into()))], "");
        session.start().await.unwrap();
        assert!(h.sink.contains("assistant: Hello there!"));
        let saved = h.store().load().unwrap().unwrap();
        assert_eq!(saved.conversation_history[0], HistoryEntry::user(GREETING_REQUEST));
        assert_eq!(saved.conversation_history.len(), 2);
    }

    #[tokio::test]
    async fn resume_prints_banner_without_greeting() {
        let h = Harness::new("session-resume");
        let mut saved = ProjectConfig {
            project_root: Some(h.fixture.mkdir("projects/app")),
            ..ProjectConfig::default()
        };
        saved.record_exchange("hi", "{}");
        h.store().save(&saved).unwrap();

        let mut session = h.session(Vec::new(), "");
        session.start().await.unwrap();
        assert_eq!(session.config(), &saved);
        assert!(h.sink.contains("Current project:"));
        assert!(h.sink.contains("Resuming previous conversation (2 entries)."));
        assert!(!h.sink.lines().iter().any(|l| l.starts_with("assistant:")));
    }

    #[tokio::test]
    async fn corrupt_state_is_quarantined_and_defaults_used() {
        let h = Harness::new("session-corrupt");
        let store = h.store();
        fs::write(store.config_path(), "{not json").unwrap();
        let mut session = h.session(vec![Err("offline".into())], "");
        session.start().await.unwrap();
        assert_eq!(session.config().project_root, None);
        assert!(h.sink.contains("warn: corrupt state file"));
        assert!(store.dir().join("project_config.json.corrupt").exists());
        assert!(h.sink.contains("warn: Could not reach the assistant yet"));
    }

    #[tokio::test]
    async fn approved_init_creates_project() {
        let h = Harness::new("session-approve");
        let mut session = h.session(
            vec![action(ActionDescriptor::InitProject { name: "demo".into() })],
            "yes\n",
        );
        session.run_turn("start a project called demo").await.unwrap();
        let root = session.config().project_root.clone().unwrap();
        assert!(root.ends_with("demo") && root.is_dir());
        assert!(h
            .sink
            .contains("approval: With your approval, I will create the project directory named 'demo'."));
        assert!(h.sink.contains("section: Project directory created at:"));
        assert_eq!(session.state(), SessionState::AwaitingInput);
    }

    #[tokio::test]
    async fn declined_action_changes_nothing_but_history() {
        let h = Harness::new("session-decline");
        let mut session = h.session(
            vec![action(ActionDescriptor::InitProject { name: "demo".into() })],
            "n\n",
        );
        session.run_turn("make demo").await.unwrap();
        assert!(!h.fixture.child("projects/demo").exists());
        assert_eq!(session.config().project_root, None);
        let saved = h.store().load().unwrap().unwrap();
        assert_eq!(
            saved.conversation_history.last(),
            Some(&HistoryEntry::user(DECLINE_NOTE))
        );
        assert!(!h.store().milestones_path().exists());
    }

    #[tokio::test]
    async fn missing_project_name_is_asked_for() {
        let h = Harness::new("session-name");
        let mut session = h.session(
            vec![action(ActionDescriptor::InitProject { name: String::new() })],
            "named_later\ny\n",
        );
        session.run_turn("new project please").await.unwrap();
        assert!(h.sink.contains(&format!("prompt: {PROJECT_NAME_PROMPT}")));
        assert!(h.fixture.child("projects/named_later").is_dir());
    }

    #[tokio::test]
    async fn read_only_action_runs_without_prompt() {
        let h = Harness::new("session-list");
        let root = h.fixture.mkdir("projects/app");
        h.fixture.write_text("projects/app/main.py", "");
        let mut session = h.session(
            vec![Ok(Interpretation::Action {
                message: "Here you go.".into(),
                action: ActionDescriptor::ListFiles { directory: None },
                requires_approval: false,
            })],
            "",
        );
        session.run_turn(&format!("/project {}", root.display())).await.unwrap();
        session.run_turn("what files are there?").await.unwrap();
        assert!(!h.sink.lines().iter().any(|l| l.starts_with("approval:")));
        assert!(h.sink.contains("section: Directory structure for 'app':"));
        assert!(h.sink.contains("detail:     main.py"));
    }

    #[tokio::test]
    async fn recoverable_action_error_keeps_session_alive() {
        let h = Harness::new("session-noproject");
        let mut session = h.session(
            vec![action(ActionDescriptor::CreateFiles {
                entries: vec![crate::action::FileEntry::file("a.txt", "")],
            })],
            "y\n",
        );
        session.run_turn("add a.txt").await.unwrap();
        assert!(h.sink.contains("error: no project is active"));
        assert_eq!(session.state(), SessionState::AwaitingInput);
    }

    #[tokio::test]
    async fn interpreter_failure_does_not_touch_history() {
        let h = Harness::new("session-fail");
        let mut session = h.session(vec![Err("garbled".into())], "");
        session.run_turn("hello").await.unwrap();
        assert!(session.config().conversation_history.is_empty());
        assert!(h.sink.contains("error: Sorry, I could not process that"));
        assert_eq!(h.store().load().unwrap(), None);
    }

    #[tokio::test]
    async fn unwritable_history_abandons_turn_without_exiting() {
        let h = Harness::new("session-savefail");
        let store = h.store();
        fs::create_dir(store.dir().join("project_config.json.tmp")).unwrap();
        let mut session = h.session(vec![Ok(Interpretation::Reply("Hi.".into()))], "");

        session.run_turn("hello").await.unwrap();
        assert!(h.sink.contains("assistant: Hi."));
        assert!(h.sink.contains("error: Could not access session state"));
        assert!(session.config().conversation_history.is_empty());
        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn action_is_skipped_when_exchange_cannot_be_saved() {
        let h = Harness::new("session-savefail-action");
        fs::create_dir(h.store().dir().join("project_config.json.tmp")).unwrap();
        let mut session = h.session(
            vec![action(ActionDescriptor::InitProject { name: "demo".into() })],
            "y\n",
        );

        session.run_turn("make demo").await.unwrap();
        assert!(!h.sink.lines().iter().any(|l| l.starts_with("approval:")));
        assert!(!h.fixture.child("projects/demo").exists());
        assert_eq!(session.config().project_root, None);
    }

    #[tokio::test]
    async fn unwritable_state_does_not_stop_run() {
        let h = Harness::new("session-savefail-run");
        fs::create_dir(h.store().dir().join("project_config.json.tmp")).unwrap();
        let mut session = h.session(Vec::new(), "hello\nexit\n");
        session.run().await.unwrap();
        assert_eq!(session.state(), SessionState::Exiting);
        assert!(h.sink.contains("detail: Goodbye!"));
    }

    #[tokio::test]
    async fn local_commands_do_not_call_the_interpreter() {
        let h = Harness::new("session-local");
        let mut session = h.session(Vec::new(), "");
        session.run_turn("/status").await.unwrap();
        session.run_turn("/milestones").await.unwrap();
        session.run_turn("/project").await.unwrap();
        session.run_turn("/project /definitely/not/here").await.unwrap();
        session.run_turn("/bogus").await.unwrap();
        assert!(session.interpreter.inputs.lock().unwrap().is_empty());
        assert!(h.sink.contains("field: project root=(none)"));
        assert!(h.sink.contains("detail: No milestones yet."));
        assert!(h.sink.contains("warn: Usage: /project <path>"));
        assert!(h.sink.contains("warn: Unknown command /bogus"));
    }

    #[tokio::test]
    async fn run_exits_on_quit_or_eof() {
        let h = Harness::new("session-exit");
        let mut session = h.session(Vec::new(), "\nQUIT\nnever read\n");
        session.run().await.unwrap();
        assert_eq!(session.state(), SessionState::Exiting);
        // Only the greeting reached the interpreter.
        assert_eq!(
            *session.interpreter.inputs.lock().unwrap(),
            vec![GREETING_REQUEST.to_string()]
        );

        let h = Harness::new("session-eof");
        let mut session = h.session(Vec::new(), "hello\n");
        session.run().await.unwrap();
        assert_eq!(session.state(), SessionState::Exiting);
        assert!(h.sink.contains("detail: Goodbye!"));
    }
}
