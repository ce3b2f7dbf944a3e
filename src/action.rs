//! Structured actions the interpreter can request.
//!
//! The model names a `command` and hands over a loosely-typed JSON `payload`;
//! [`ActionDescriptor::from_command`] turns that pair into one typed variant.
//! Descriptors are built per turn and never persisted.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Marker value that means "directory" in map-style `create_files` payloads.
pub const CREATE_DIR_MARKER: &str = "__CREATE_DIR__";

/// Command names understood by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    InitProject,
    CreateFiles,
    ListFiles,
    UpdateMilestones,
    CreatePresentationPlan,
    None,
}

impl ActionKind {
    /// Parse a wire command name, accepting the older aliases.
    pub fn parse(command: &str) -> Option<Self> {
        match command.trim().to_ascii_lowercase().as_str() {
            "init_project" => Some(Self::InitProject),
            "create_files" => Some(Self::CreateFiles),
            "list_files" => Some(Self::ListFiles),
            "update_milestones" | "milestones" => Some(Self::UpdateMilestones),
            "create_presentation_plan" => Some(Self::CreatePresentationPlan),
            "none" | "no_action" | "" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitProject => "init_project",
            Self::CreateFiles => "create_files",
            Self::ListFiles => "list_files",
            Self::UpdateMilestones => "update_milestones",
            Self::CreatePresentationPlan => "create_presentation_plan",
            Self::None => "none",
        }
    }

    /// True when executing this kind changes the filesystem or saved state.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::ListFiles | Self::None)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file or directory to create, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    #[serde(alias = "path")]
    pub name: String,
    #[serde(default, alias = "isDirectory", alias = "is_dir")]
    pub is_directory: bool,
    #[serde(default)]
    pub content: Option<String>,
}

impl FileEntry {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            content: Some(content.into()),
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            content: None,
        }
    }
}

/// Upsert request for one milestone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MilestoneUpdate {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub content: String,
}

/// Outline request. An empty `slides` list selects the fixed section template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresentationPlan {
    #[serde(default, alias = "title")]
    pub topic: String,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

/// A typed, executable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDescriptor {
    /// `name` may be empty when the model did not supply one.
    InitProject { name: String },
    CreateFiles { entries: Vec<FileEntry> },
    /// `directory` scopes the listing to a subdirectory of the project root.
    ListFiles { directory: Option<String> },
    UpdateMilestones { updates: Vec<MilestoneUpdate> },
    CreatePresentationPlan(PresentationPlan),
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct InitPayload {
    #[serde(default, alias = "name")]
    project_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CreatePayload {
    Listed {
        #[serde(alias = "entries")]
        files: Vec<FileEntry>,
    },
    Mapped(BTreeMap<String, String>),
}

#[derive(Deserialize)]
struct ListPayload {
    #[serde(default)]
    directory: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MilestonePayload {
    Many { milestones: Vec<MilestoneUpdate> },
    One(MilestoneUpdate),
}

impl ActionDescriptor {
    /// Build a descriptor from a wire command and payload.
    ///
    /// Returns `Ok(None)` for the `none` command. Errors describe what was
    /// wrong so the message can be fed back to the model.
    pub fn from_command(command: &str, payload: Value) -> Result<Option<Self>, String> {
        let kind = ActionKind::parse(command).ok_or_else(|| format!("unknown command `{command}`"))?;
        // Models sometimes send `null` for "no payload".
        let payload = if payload.is_null() {
            Value::Object(Default::default())
        } else {
            payload
        };
        let invalid = |e: serde_json::Error| format!("invalid payload for `{kind}`: {e}");

        let action = match kind {
            ActionKind::None => return Ok(None),
            ActionKind::InitProject => {
                let p: InitPayload = serde_json::from_value(payload).map_err(invalid)?;
                Self::InitProject {
                    name: p.project_name.unwrap_or_default().trim().to_string(),
                }
            }
            ActionKind::CreateFiles => {
                let p: CreatePayload = serde_json::from_value(payload).map_err(invalid)?;
                let entries = match p {
                    CreatePayload::Listed { files } => files,
                    CreatePayload::Mapped(map) => map
                        .into_iter()
                        .map(|(name, content)| {
                            if content == CREATE_DIR_MARKER {
                                FileEntry::directory(name)
                            } else {
                                FileEntry::file(name, content)
                            }
                        })
                        .collect(),
                };
                Self::CreateFiles { entries }
            }
            ActionKind::ListFiles => {
                let p: ListPayload = serde_json::from_value(payload).map_err(invalid)?;
                let directory = p
                    .directory
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty() && d != ".");
                Self::ListFiles { directory }
            }
            ActionKind::UpdateMilestones => {
                let p: MilestonePayload = serde_json::from_value(payload).map_err(invalid)?;
                let updates = match p {
                    MilestonePayload::Many { milestones } => milestones,
                    MilestonePayload::One(update) => vec![update],
                };
                Self::UpdateMilestones { updates }
            }
            ActionKind::CreatePresentationPlan => {
                Self::CreatePresentationPlan(serde_json::from_value(payload).map_err(invalid)?)
            }
        };
        Ok(Some(action))
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::InitProject { .. } => ActionKind::InitProject,
            Self::CreateFiles { .. } => ActionKind::CreateFiles,
            Self::ListFiles { .. } => ActionKind::ListFiles,
            Self::UpdateMilestones { .. } => ActionKind::UpdateMilestones,
            Self::CreatePresentationPlan(_) => ActionKind::CreatePresentationPlan,
        }
    }

    /// Sentence fragment shown after "With your approval, I will ".
    pub fn describe(&self) -> String {
        match self {
            Self::InitProject { name } => {
                format!("create the project directory named '{name}'.")
            }
            Self::CreateFiles { entries } => {
                let (dirs, files): (Vec<&FileEntry>, Vec<&FileEntry>) =
                    entries.iter().partition(|e| e.is_directory);
                let join = |list: &[&FileEntry]| {
                    list.iter()
                        .map(|e| e.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                match (dirs.is_empty(), files.is_empty()) {
                    (false, false) => format!(
                        "create the following directories: {} and files: {}.",
                        join(&dirs),
                        join(&files)
                    ),
                    (true, false) => format!("create the following files: {}.", join(&files)),
                    (false, true) => {
                        format!("create the following directories: {}.", join(&dirs))
                    }
                    (true, true) => "create nothing (no entries were given).".to_string(),
                }
            }
            Self::ListFiles { directory } => match directory {
                Some(dir) => format!("list the files under '{dir}' in the project."),
                None => "list the files in the project.".to_string(),
            },
            Self::UpdateMilestones { updates } => {
                let items = updates
                    .iter()
                    .map(|u| format!("'{}' -> {}", u.name, u.status))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("update the project milestones: {items}.")
            }
            Self::CreatePresentationPlan(plan) => {
                let topic = if plan.topic.trim().is_empty() {
                    "presentation plan"
                } else {
                    plan.topic.trim()
                };
                format!("create a Markdown file for the '{topic}' presentation.")
            }
        }
    }
}
