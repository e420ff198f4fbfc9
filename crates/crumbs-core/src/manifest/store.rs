//! Durable storage for the manifest

use chrono::Utc;
use crumbs_fs::{ConfigStore, NormalizedPath, RobustnessConfig};
use tracing::debug;

use super::Manifest;
use crate::{Error, Result};

/// Loads and saves the manifest at one location.
///
/// The store is the only writer of the manifest file. Saves go through
/// [`crumbs_fs::io::write_atomic`], so a failed save leaves the previous file
/// untouched.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: NormalizedPath,
    documents: ConfigStore,
}

impl ManifestStore {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            documents: ConfigStore::new(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.documents = ConfigStore::with_robustness(robustness);
        self
    }

    /// Location of the manifest file
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the manifest.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no manifest exists yet, [`Error::StoreFailure`]
    /// if it cannot be read or parsed.
    pub fn load(&self) -> Result<Manifest> {
        let manifest: Manifest = self
            .documents
            .load(&self.path)
            .map_err(|e| Error::store(self.path.to_native(), e))?;
        debug!(path = %self.path, records = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Save the complete manifest, recomputing its aggregates and stamping
    /// `updated_at` immediately before writing.
    pub fn save(&self, manifest: &mut Manifest) -> Result<()> {
        manifest.touch(Utc::now());
        self.documents
            .save(&self.path, manifest)
            .map_err(|e| Error::store(self.path.to_native(), e))?;
        debug!(
            path = %self.path,
            records = manifest.file_count(),
            bytes = manifest.total_size_bytes(),
            "Saved manifest"
        );
        Ok(())
    }

    /// Persist an empty manifest if none exists yet.
    ///
    /// Returns `true` when a new manifest was created.
    pub fn bootstrap(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        self.save(&mut Manifest::new())?;
        Ok(true)
    }
}
