//! The manifest: the persisted inventory of tracked files
//!
//! Records keep their insertion order for readability. Lookups go through a
//! case-insensitive path index that is rebuilt whenever records are removed
//! or the manifest is deserialized.

mod record;
mod store;

pub use record::FileRecord;
pub use store::ManifestStore;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use crumbs_fs::PathKey;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Inventory of tracked files plus aggregates derived from them.
///
/// `file_count` and `total_size_bytes` are refreshed by
/// [`Manifest::refresh_aggregates`], which the store calls before every
/// write; they are never trusted from a loaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ManifestDocument")]
pub struct Manifest {
    file_count: u64,
    total_size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    files: Vec<FileRecord>,
    #[serde(skip)]
    index: HashMap<PathKey, usize>,
}

/// On-disk shape of a manifest, before the index is built.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestDocument {
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    files: Vec<FileRecord>,
}

impl From<ManifestDocument> for Manifest {
    fn from(document: ManifestDocument) -> Self {
        let mut manifest = Manifest::from_records(document.files);
        manifest.updated_at = document.updated_at;
        manifest
    }
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from records, keeping the first record for each
    /// case-insensitive path.
    pub fn from_records(records: Vec<FileRecord>) -> Self {
        let mut manifest = Self {
            files: records,
            ..Self::default()
        };
        manifest.reindex();
        manifest.refresh_aggregates();
        manifest
    }

    /// All records, in insertion order
    pub fn records(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of records as of the last aggregate refresh
    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    /// Sum of `size_bytes` as of the last aggregate refresh
    pub fn total_size_bytes(&self) -> u64 {
        self.total_size_bytes
    }

    /// When the manifest was last saved
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn contains(&self, key: &PathKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &PathKey) -> Option<&FileRecord> {
        self.index.get(key).map(|&idx| &self.files[idx])
    }

    /// Insert a record, replacing any record with the same path key in place.
    ///
    /// Returns the replaced record, if any.
    pub fn upsert(&mut self, record: FileRecord) -> Option<FileRecord> {
        let key = record.key();
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.files[idx], record)),
            None => {
                self.index.insert(key, self.files.len());
                self.files.push(record);
                None
            }
        }
    }

    /// Remove every record matching `remove`, returning the removed records
    /// in their original order.
    pub fn remove_where(&mut self, mut remove: impl FnMut(&FileRecord) -> bool) -> Vec<FileRecord> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|record| remove(record));
        self.files = kept;
        self.reindex();
        removed
    }

    /// Recompute `file_count` and `total_size_bytes` from the records.
    pub fn refresh_aggregates(&mut self) {
        self.file_count = self.files.len() as u64;
        self.total_size_bytes = self.files.iter().map(|f| f.size_bytes).sum();
    }

    /// Refresh aggregates and stamp the manifest as updated at `now`.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.refresh_aggregates();
        self.updated_at = Some(now);
    }

    fn reindex(&mut self) {
        self.index.clear();
        let mut duplicates = 0usize;
        let files = std::mem::take(&mut self.files);
        for record in files {
            let key = record.key();
            if self.index.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            self.index.insert(key, self.files.len());
            self.files.push(record);
        }
        if duplicates > 0 {
            warn!(duplicates, "Dropped manifest records with duplicate paths");
        }
    }
}
