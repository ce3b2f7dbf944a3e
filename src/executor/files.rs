//! Filesystem helpers for `create_files`: path containment and per-entry
//! creation that never overwrites.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use crate::action::FileEntry;
use crate::error::ActionError;

/// What happened to one requested entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    CreatedFile { name: String, bytes: usize },
    CreatedDir { name: String },
    Skipped { name: String, reason: String },
}

impl EntryOutcome {
    pub fn is_created(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::CreatedFile { name, bytes } => format!("created file: {name} ({bytes} bytes)"),
            Self::CreatedDir { name } => format!("created directory: {name}/"),
            Self::Skipped { name, reason } => format!("skipped {name}: {reason}"),
        }
    }
}

/// Join `relative` onto `root`, refusing `..`, absolute paths and the root
/// itself. Symlinks are checked separately by [`ensure_contained`].
pub fn resolve_inside(root: &Path, relative: &str) -> Result<PathBuf, String> {
    let trimmed = relative.trim();
    if trimmed.is_empty() {
        return Err("empty path".to_string());
    }
    let rel = Path::new(trimmed);
    let mut normal = 0usize;
    for component in rel.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            Component::ParentDir => return Err("path may not contain `..`".to_string()),
            Component::RootDir | Component::Prefix(_) => {
                return Err("path must be relative to the project root".to_string())
            }
        }
    }
    if normal == 0 {
        return Err("path names the project root itself".to_string());
    }
    Ok(root.join(rel))
}

/// Require the deepest existing ancestor of `target` to resolve under `root`.
pub fn ensure_contained(root: &Path, target: &Path) -> Result<(), String> {
    let canonical_root =
        fs::canonicalize(root).map_err(|e| format!("{}: {e}", root.display()))?;
    let existing = target.ancestors().find(|p| p.exists()).unwrap_or(root);
    let resolved = fs::canonicalize(existing).map_err(|e| e.to_string())?;
    if resolved.starts_with(&canonical_root) {
        Ok(())
    } else {
        Err("path leads outside the project root through a symlink".to_string())
    }
}

/// Create one entry. Existing targets and bad paths are reported as skips;
/// only permission failures abort the whole request.
pub fn create_entry(root: &Path, entry: &FileEntry) -> Result<EntryOutcome, ActionError> {
    let name = entry.name.trim().to_string();
    let skip = |reason: String| EntryOutcome::Skipped {
        name: name.clone(),
        reason,
    };

    let target = match resolve_inside(root, &name) {
        Ok(target) => target,
        Err(reason) => return Ok(skip(reason)),
    };
    if fs::symlink_metadata(&target).is_ok() {
        return Ok(skip("already exists".to_string()));
    }
    if let Err(reason) = ensure_contained(root, &target) {
        return Ok(skip(reason));
    }

    let result = if entry.is_directory {
        fs::create_dir_all(&target).map(|()| EntryOutcome::CreatedDir { name: name.clone() })
    } else {
        let content = entry.content.as_deref().unwrap_or_default();
        write_new_file(&target, content).map(|()| EntryOutcome::CreatedFile {
            name: name.clone(),
            bytes: content.len(),
        })
    };

    match result {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(ActionError::io(target, e)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(skip("already exists".to_string())),
        Err(e) => Ok(skip(e.to_string())),
    }
}

fn write_new_file(target: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    // `create_new` keeps us from clobbering a file that appeared after the
    // existence check.
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}
