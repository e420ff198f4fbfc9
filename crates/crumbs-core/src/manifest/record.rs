//! One tracked file in the manifest

use chrono::{DateTime, Utc};
use crumbs_fs::{Fingerprint, NormalizedPath, PathKey, Signature};
use serde::{Deserialize, Serialize};

/// A tracked file: its identity, last-known fingerprint and lifecycle
/// timestamps.
///
/// `content_hash` always belongs to the `size_bytes`/`modified_at` captured in
/// the same fingerprint; the two are never refreshed independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Absolute path; unique within a manifest, compared case-insensitively
    pub path: NormalizedPath,
    /// Lowercase hex SHA-256 of the file content
    #[serde(default)]
    pub content_hash: String,
    pub size_bytes: u64,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "modified")]
    pub modified_at: DateTime<Utc>,
    /// When the hash was last computed
    pub checked_at: DateTime<Utc>,
    /// When the path first entered the manifest; never changes afterwards
    pub added_at: DateTime<Utc>,
    /// When the record was last revised, absent until the first revision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Build a record for a path entering the manifest for the first time.
    pub fn new(path: NormalizedPath, fingerprint: Fingerprint, now: DateTime<Utc>) -> Self {
        Self {
            path,
            content_hash: fingerprint.hash,
            size_bytes: fingerprint.size,
            created_at: fingerprint.created,
            modified_at: fingerprint.modified,
            checked_at: now,
            added_at: now,
            updated_at: None,
        }
    }

    /// A revised copy of this record carrying a fresh fingerprint.
    ///
    /// The path and `added_at` are kept; `checked_at` and `updated_at` are
    /// stamped with `now`.
    pub fn revised(&self, fingerprint: Fingerprint, now: DateTime<Utc>) -> Self {
        Self {
            path: self.path.clone(),
            content_hash: fingerprint.hash,
            size_bytes: fingerprint.size,
            created_at: fingerprint.created,
            modified_at: fingerprint.modified,
            checked_at: now,
            added_at: self.added_at,
            updated_at: Some(now),
        }
    }

    /// This record under another spelling of the same path key, stamped as
    /// revised at `now`. The fingerprint and `added_at` are kept.
    pub fn respelled(&self, path: NormalizedPath, now: DateTime<Utc>) -> Self {
        debug_assert_eq!(path.key(), self.key());
        Self {
            path,
            updated_at: Some(now),
            ..self.clone()
        }
    }

    pub fn key(&self) -> PathKey {
        self.path.key()
    }

    /// The size and mtime recorded with the current hash.
    pub fn signature(&self) -> Signature {
        Signature {
            size: self.size_bytes,
            modified: self.modified_at,
        }
    }

    /// Whether the on-disk signature still matches this record.
    pub fn is_current(&self, on_disk: &Signature) -> bool {
        self.signature() == *on_disk
    }
}
