//! Lazy depth-first listing of a project directory.
//!
//! [`ProjectTree::iter`] hands out a fresh walker each call, so a listing can
//! be restarted at any point. Directories are read only when the walker
//! reaches them. Symlinked directories are listed but never entered.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const INDENT: &str = "    ";

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub depth: usize,
    pub name: String,
    pub is_dir: bool,
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str(INDENT)?;
        }
        f.write_str(&self.name)?;
        if self.is_dir {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// A directory to list.
#[derive(Debug, Clone)]
pub struct ProjectTree {
    root: PathBuf,
}

impl ProjectTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a new walk from the root.
    pub fn iter(&self) -> TreeWalk {
        TreeWalk {
            stack: vec![Pending {
                path: self.root.clone(),
                depth: 0,
                is_dir: true,
            }],
        }
    }
}

impl<'a> IntoIterator for &'a ProjectTree {
    type Item = io::Result<TreeLine>;
    type IntoIter = TreeWalk;

    fn into_iter(self) -> TreeWalk {
        self.iter()
    }
}

#[derive(Debug)]
struct Pending {
    path: PathBuf,
    depth: usize,
    is_dir: bool,
}

/// Depth-first walker over a [`ProjectTree`].
#[derive(Debug)]
pub struct TreeWalk {
    stack: Vec<Pending>,
}

impl Iterator for TreeWalk {
    type Item = io::Result<TreeLine>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let line = TreeLine {
            depth: node.depth,
            name: display_name(&node.path),
            is_dir: node.is_dir,
        };
        if node.is_dir {
            match sorted_children(&node.path) {
                Ok(children) => {
                    // Reverse so the first child is popped next.
                    self.stack
                        .extend(children.into_iter().rev().map(|(path, is_dir)| Pending {
                            path,
                            depth: node.depth + 1,
                            is_dir,
                        }));
                }
                Err(e) => {
                    return Some(Err(io::Error::new(
                        e.kind(),
                        format!("{}: {e}", node.path.display()),
                    )))
                }
            }
        }
        Some(Ok(line))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Directories first, then files, each group sorted by name.
fn sorted_children(dir: &Path) -> io::Result<Vec<(PathBuf, bool)>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // `file_type` does not follow symlinks, which keeps the walk acyclic.
        let is_dir = entry.file_type()?.is_dir();
        children.push((entry.path(), is_dir));
    }
    children.sort_by(|(a, a_dir), (b, b_dir)| {
        b_dir
            .cmp(a_dir)
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(children)
}
