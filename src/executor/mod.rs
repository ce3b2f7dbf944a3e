//! Performs approved actions against the filesystem and the state store.
//!
//! Every mutation is made durable before a report is returned: the project
//! config and milestone set are written through the [`StateStore`] first, and
//! the in-memory [`ProjectConfig`] is only updated once that write succeeded.

mod files;
mod presentation;
mod tree;

pub use files::{resolve_inside, EntryOutcome};
pub use presentation::{render_outline, slugify};
pub use tree::{ProjectTree, TreeLine, TreeWalk};

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::action::{ActionDescriptor, FileEntry, MilestoneUpdate, PresentationPlan};
use crate::error::{ActionError, StateError};
use crate::state::{self, ProjectConfig, StateStore, UpsertOutcome};

/// Human-readable result of an executed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub summary: String,
    /// Detail rows printed under the summary, already formatted.
    pub lines: Vec<String>,
}

impl ActionReport {
    fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            lines: Vec::new(),
        }
    }

    fn with_lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }
}

impl fmt::Display for ActionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)?;
        for line in &self.lines {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

/// Dispatches descriptors to their handlers.
#[derive(Debug, Clone)]
pub struct Executor {
    store: StateStore,
    projects_dir: PathBuf,
}

impl Executor {
    pub fn new(store: StateStore, projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            projects_dir: projects_dir.into(),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Approval text for `action`, noting when an existing outline would be
    /// replaced.
    pub fn describe(&self, action: &ActionDescriptor, config: &ProjectConfig) -> String {
        if let (ActionDescriptor::CreatePresentationPlan(plan), Some(root)) =
            (action, config.project_root.as_deref())
        {
            let path = outline_path(root, plan);
            if path.exists() {
                return format!(
                    "overwrite the existing Markdown file {} for the '{}' presentation.",
                    path.display(),
                    plan.topic.trim()
                );
            }
        }
        action.describe()
    }

    pub fn execute(
        &self,
        action: &ActionDescriptor,
        config: &mut ProjectConfig,
    ) -> Result<ActionReport, ActionError> {
        debug!(kind = %action.kind(), "executing action");
        let report = match action {
            ActionDescriptor::InitProject { name } => self.init_project(name, config),
            ActionDescriptor::CreateFiles { entries } => self.create_files(entries, config),
            ActionDescriptor::ListFiles { directory } => {
                self.list_files(directory.as_deref(), config)
            }
            ActionDescriptor::UpdateMilestones { updates } => self.update_milestones(updates),
            ActionDescriptor::CreatePresentationPlan(plan) => {
                self.create_presentation_plan(plan, config)
            }
        }?;
        info!(kind = %action.kind(), summary = %report.summary, "action completed");
        Ok(report)
    }

    /// Create `<projects_dir>/<name>` and make it the project root.
    pub fn init_project(
        &self,
        name: &str,
        config: &mut ProjectConfig,
    ) -> Result<ActionReport, ActionError> {
        let name = validate_project_name(name)?;
        let target = self.projects_dir.join(name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(ActionError::AlreadyExists(target));
        }
        fs::create_dir_all(&self.projects_dir)
            .map_err(|e| ActionError::io(&self.projects_dir, e))?;
        fs::create_dir(&target).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ActionError::AlreadyExists(target.clone()),
            _ => ActionError::io(&target, e),
        })?;
        let root = fs::canonicalize(&target).unwrap_or_else(|_| target.clone());

        let mut next = config.clone();
        next.project_root = Some(root.clone());
        if let Err(e) = self.store.save(&next) {
            // Leave no half-initialized project behind if the config is not durable.
            if let Err(rm) = fs::remove_dir(&target) {
                warn!(
                    path = %target.display(),
                    error = %rm,
                    "could not remove new project directory"
                );
            }
            return Err(e.into());
        }
        *config = next;
        Ok(ActionReport::new(format!(
            "Project directory created at: {}",
            root.display()
        )))
    }

    /// Create each entry under the project root, reporting per entry.
    pub fn create_files(
        &self,
        entries: &[FileEntry],
        config: &ProjectConfig,
    ) -> Result<ActionReport, ActionError> {
        let root = require_root(config)?;
        if entries.is_empty() {
            return Ok(ActionReport::new("No files or directories were requested."));
        }
        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            outcomes.push(files::create_entry(root, entry)?);
        }
        let created = outcomes.iter().filter(|o| o.is_created()).count();
        let skipped = outcomes.len() - created;
        let summary = if skipped == 0 {
            format!("Created {created} of {} entries.", outcomes.len())
        } else {
            format!(
                "Created {created} of {} entries ({skipped} skipped).",
                outcomes.len()
            )
        };
        Ok(ActionReport::new(summary).with_lines(outcomes.iter().map(EntryOutcome::describe).collect()))
    }

    /// Render the project tree (or a subdirectory of it).
    pub fn list_files(
        &self,
        directory: Option<&str>,
        config: &ProjectConfig,
    ) -> Result<ActionReport, ActionError> {
        let root = require_root(config)?;
        let start = match directory {
            Some(dir) => {
                let start = resolve_inside(root, dir).map_err(ActionError::InvalidInput)?;
                files::ensure_contained(root, &start).map_err(ActionError::InvalidInput)?;
                start
            }
            None => root.to_path_buf(),
        };
        if !start.is_dir() {
            return Err(ActionError::InvalidInput(format!(
                "{} is not a directory",
                start.display()
            )));
        }
        let tree = ProjectTree::new(&start);
        let mut lines = Vec::new();
        for line in &tree {
            match line {
                Ok(line) => lines.push(line.to_string()),
                Err(e) => lines.push(format!("[unreadable: {e}]")),
            }
        }
        let label = start
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| start.display().to_string());
        Ok(ActionReport::new(format!("Directory structure for '{label}':")).with_lines(lines))
    }

    /// Upsert each milestone, then persist the set.
    pub fn update_milestones(
        &self,
        updates: &[MilestoneUpdate],
    ) -> Result<ActionReport, ActionError> {
        if let Some(bad) = updates.iter().find(|u| u.name.trim().is_empty()) {
            return Err(ActionError::InvalidInput(format!(
                "milestone with status `{}` has no name",
                bad.status
            )));
        }
        let mut milestones = self.store.load_milestones()?;
        let mut lines = Vec::with_capacity(updates.len());
        for update in updates {
            let outcome =
                milestones.upsert(update.name.as_str(), update.status.as_str(), update.notes.clone());
            let verb = match outcome {
                UpsertOutcome::Created => "added",
                UpsertOutcome::Updated => "updated",
            };
            lines.push(format!("{verb} '{}': {}", update.name.trim(), update.status.trim()));
        }
        self.store.save_milestones(&milestones)?;
        Ok(ActionReport::new(format!(
            "Updated milestones in '{}' ({} tracked).",
            self.store.milestones_path().display(),
            milestones.len()
        ))
        .with_lines(lines))
    }

    /// Write `<slug>.md` under the project root.
    pub fn create_presentation_plan(
        &self,
        plan: &PresentationPlan,
        config: &ProjectConfig,
    ) -> Result<ActionReport, ActionError> {
        let root = require_root(config)?;
        let path = outline_path(root, plan);
        let existed = path.exists();
        state::write_atomic(&path, render_outline(plan).as_bytes()).map_err(|e| match e {
            StateError::Io { path, source } => ActionError::Io { path, source },
            other => ActionError::State(other),
        })?;
        let verb = if existed { "Rewrote" } else { "Created" };
        Ok(ActionReport::new(format!(
            "{verb} presentation plan at: {}",
            path.display()
        )))
    }
}

fn outline_path(root: &Path, plan: &PresentationPlan) -> PathBuf {
    root.join(format!("{}.md", slugify(&plan.topic)))
}

fn require_root(config: &ProjectConfig) -> Result<&Path, ActionError> {
    config
        .project_root
        .as_deref()
        .ok_or(ActionError::NoProject)
}

/// A project name must be a single plain path component.
fn validate_project_name(name: &str) -> Result<&str, ActionError> {
    let name = name.trim();
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(ActionError::InvalidInput(format!(
            "`{name}` is not a valid project name; use a single directory name"
        ))),
    }
}
