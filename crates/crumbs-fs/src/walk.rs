//! Recursive enumeration of regular files under a root directory

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::NormalizedPath;

/// Enumerates regular files below a root.
///
/// Directories that cannot be read (permission denied, removed mid-walk) are
/// logged and skipped; the walk carries on with their siblings. Excluded
/// paths, and everything underneath them, are never yielded.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
    excluded: Vec<NormalizedPath>,
}

impl Walker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: absolutize(root.as_ref()),
            follow_symlinks: false,
            excluded: Vec::new(),
        }
    }

    /// Follow symbolic links to files and directories. Off by default, in
    /// which case links are not reported at all.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Never report `path`, nor anything below it when it is a directory.
    pub fn exclude(mut self, path: impl AsRef<Path>) -> Self {
        self.excluded
            .push(NormalizedPath::new(absolutize(path.as_ref())));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and return the absolute paths of all regular files,
    /// sorted by path. A missing root yields an empty list.
    pub fn walk(&self) -> Vec<NormalizedPath> {
        let mut files: Vec<NormalizedPath> = WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| self.root.display().to_string());
                    warn!(path = %path, error = %err, "Skipping inaccessible path");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| NormalizedPath::new(entry.path()))
            .collect();

        files.sort();
        debug!(root = %self.root.display(), count = files.len(), "Walk finished");
        files
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let candidate = NormalizedPath::new(path);
        self.excluded.iter().any(|ex| candidate.starts_with(ex))
    }
}

/// Resolve `path` to an absolute path with symlinks resolved as far as the
/// path exists. Components below the deepest existing ancestor are appended
/// unchanged, so paths that do not exist yet compare equal to the same paths
/// once created.
pub fn absolutize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = dunce::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}
