//! The run's single view of the files on disk

use std::collections::HashMap;

use crumbs_fs::{NormalizedPath, PathKey, Walker};

/// Paths found by one walk, indexed by their case-insensitive keys.
///
/// Taken once at the start of a run and shared by all passes, so files
/// created later are picked up by the next run.
#[derive(Debug, Clone, Default)]
pub struct DiskSnapshot {
    paths: Vec<NormalizedPath>,
    spellings: HashMap<PathKey, Vec<usize>>,
}

impl DiskSnapshot {
    pub fn capture(walker: &Walker) -> Self {
        Self::from_paths(walker.walk())
    }

    pub fn from_paths(paths: Vec<NormalizedPath>) -> Self {
        let mut spellings: HashMap<PathKey, Vec<usize>> = HashMap::new();
        for (idx, path) in paths.iter().enumerate() {
            spellings.entry(path.key()).or_default().push(idx);
        }
        Self { paths, spellings }
    }

    pub fn paths(&self) -> &[NormalizedPath] {
        &self.paths
    }

    pub fn contains(&self, key: &PathKey) -> bool {
        self.spellings.contains_key(key)
    }

    /// The on-disk spelling of `path`.
    ///
    /// `path` itself when it was walked, otherwise the first walked path
    /// sharing its key. `None` when no walked path has that key.
    pub fn resolve(&self, path: &NormalizedPath) -> Option<&NormalizedPath> {
        let candidates = self.spellings.get(&path.key())?;
        candidates
            .iter()
            .map(|&idx| &self.paths[idx])
            .find(|candidate| *candidate == path)
            .or_else(|| candidates.first().map(|&idx| &self.paths[idx]))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
