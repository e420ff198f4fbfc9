//! [`TestTree`] builder for reconciliation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary directory split into a root to scan (`data/`) and a state
/// directory (`state/`) for the manifest and session files.
///
/// # Example
///
/// ```rust,no_run
/// use crumbs_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("a/x.txt", "0123456789");
/// tree.assert_file_exists("a/x.txt");
/// let manifest = tree.manifest_path();
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create empty `data/` and `state/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        fs::create_dir_all(temp_dir.path().join("state")).unwrap();
        Self { temp_dir }
    }

    /// The directory to reconcile.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Directory outside the root for tool state.
    pub fn state(&self) -> PathBuf {
        self.temp_dir.path().join("state")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state().join("manifest.json")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.state().join("sessions")
    }

    /// Absolute path of `rel` under the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).unwrap();
    }

    pub fn rename(&self, from: &str, to: &str) {
        let target = self.path(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::rename(self.path(from), target).unwrap();
    }

    /// Set the modification time of `rel`.
    pub fn set_modified(&self, rel: &str, time: SystemTime) {
        let file = fs::File::options().write(true).open(self.path(rel)).unwrap();
        file.set_modified(time).unwrap();
    }

    /// Move the modification time of `rel` forward without touching its
    /// content or size.
    pub fn touch_later(&self, rel: &str, by: Duration) {
        let current = fs::metadata(self.path(rel)).unwrap().modified().unwrap();
        self.set_modified(rel, current + by);
    }

    /// Assert that `rel` exists under the root.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Session files written so far, sorted by name.
    pub fn session_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match fs::read_dir(self.sessions_dir()) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    /// Raw path to the temporary directory itself.
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }
}
