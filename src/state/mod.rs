//! Durable state: the project config and the milestone set, each stored as
//! one JSON document under the state directory.
//!
//! A missing document reads as empty state. A document that exists but does
//! not parse is reported as [`StateError::Corrupt`] and never replaced
//! silently; callers decide whether to [`StateStore::quarantine`] it.

mod milestones;
mod project;

pub use milestones::{Milestone, MilestoneSet, UpsertOutcome};
pub use project::{HistoryEntry, ProjectConfig, Role};

use crate::error::StateError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the project config document.
pub const PROJECT_CONFIG_FILE: &str = "project_config.json";
/// File name of the milestone document.
pub const MILESTONES_FILE: &str = "milestones.json";
/// On-disk schema version for both documents.
const STATE_FILE_VERSION: u32 = 1;

fn current_version() -> u32 {
    STATE_FILE_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedProject {
    #[serde(default = "current_version")]
    version: u32,
    #[serde(default, alias = "root_dir")]
    project_root: Option<PathBuf>,
    #[serde(default)]
    conversation_history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedMilestones {
    #[serde(default = "current_version")]
    version: u32,
    #[serde(default)]
    milestones: MilestoneSet,
}

/// Filesystem-backed store for the two state documents.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StateError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StateError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(PROJECT_CONFIG_FILE)
    }

    pub fn milestones_path(&self) -> PathBuf {
        self.dir.join(MILESTONES_FILE)
    }

    /// Load the saved project config, or `None` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<ProjectConfig>, StateError> {
        let path = self.config_path();
        let Some(doc) = read_document::<PersistedProject>(&path)? else {
            return Ok(None);
        };
        check_version(&path, doc.version)?;
        Ok(Some(ProjectConfig {
            project_root: doc.project_root,
            conversation_history: doc.conversation_history,
        }))
    }

    pub fn save(&self, config: &ProjectConfig) -> Result<(), StateError> {
        let doc = PersistedProject {
            version: STATE_FILE_VERSION,
            project_root: config.project_root.clone(),
            conversation_history: config.conversation_history.clone(),
        };
        write_document(&self.config_path(), &doc)
    }

    /// Load milestones; a missing file is an empty set.
    pub fn load_milestones(&self) -> Result<MilestoneSet, StateError> {
        let path = self.milestones_path();
        let Some(doc) = read_document::<PersistedMilestones>(&path)? else {
            return Ok(MilestoneSet::new());
        };
        check_version(&path, doc.version)?;
        Ok(doc.milestones)
    }

    pub fn save_milestones(&self, milestones: &MilestoneSet) -> Result<(), StateError> {
        let doc = PersistedMilestones {
            version: STATE_FILE_VERSION,
            milestones: milestones.clone(),
        };
        write_document(&self.milestones_path(), &doc)
    }

    /// Move an unreadable document aside to `<file>.corrupt` so the next save
    /// does not destroy it. Returns the new location.
    pub fn quarantine(&self, path: &Path) -> Result<PathBuf, StateError> {
        let mut target = path.as_os_str().to_owned();
        target.push(".corrupt");
        let target = PathBuf::from(target);
        fs::rename(path, &target).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        warn!(from = %path.display(), to = %target.display(), "quarantined corrupt state file");
        Ok(target)
    }
}

fn check_version(path: &Path, version: u32) -> Result<(), StateError> {
    if version != STATE_FILE_VERSION {
        return Err(StateError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("unsupported state file version {version}"),
        });
    }
    Ok(())
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StateError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StateError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let doc = serde_json::from_str(&raw).map_err(|e| StateError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "loaded state document");
    Ok(Some(doc))
}

fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<(), StateError> {
    let json = serde_json::to_vec_pretty(doc).map_err(|e| StateError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidData, e),
    })?;
    write_atomic(path, &json)?;
    debug!(path = %path.display(), bytes = json.len(), "saved state document");
    Ok(())
}

/// Write through a sibling temp file and rename it into place, so a crash
/// leaves either the old document or the new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StateError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(|source| StateError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
