//! Content analysis: turning paths into fingerprinted records

use chrono::Utc;
use crumbs_fs::{Fingerprint, NormalizedPath, Signature, fingerprint};

use crate::Result;
use crate::manifest::FileRecord;

/// Produces fingerprints for the reconciliation passes.
///
/// The default [`FsAnalyzer`] reads the real filesystem; the trait exists so
/// a run can be driven against an analyzer with different read semantics.
pub trait ContentAnalyzer: Send + Sync {
    /// Size and modification time, without reading content
    fn signature(&self, path: &NormalizedPath) -> Result<Signature>;

    /// Full content hash plus metadata
    fn fingerprint(&self, path: &NormalizedPath) -> Result<Fingerprint>;

    /// Fingerprint a path that is not yet in the manifest.
    fn analyze_new(&self, path: &NormalizedPath) -> Result<FileRecord> {
        let fingerprint = self.fingerprint(path)?;
        Ok(FileRecord::new(path.clone(), fingerprint, Utc::now()))
    }

    /// Re-fingerprint a tracked file whose signature changed.
    fn analyze_existing(&self, record: &FileRecord) -> Result<FileRecord> {
        let fingerprint = self.fingerprint(&record.path)?;
        Ok(record.revised(fingerprint, Utc::now()))
    }
}

/// [`ContentAnalyzer`] backed by `crumbs_fs::fingerprint`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAnalyzer;

impl ContentAnalyzer for FsAnalyzer {
    fn signature(&self, path: &NormalizedPath) -> Result<Signature> {
        Ok(fingerprint::signature(&path.to_native())?)
    }

    fn fingerprint(&self, path: &NormalizedPath) -> Result<Fingerprint> {
        Ok(fingerprint::fingerprint(&path.to_native())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::fs;

    #[test]
    fn analyze_new_stamps_added_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("a.txt"));
        fs::write(path.to_native(), "abc").unwrap();

        let before = Utc::now();
        let record = FsAnalyzer.analyze_new(&path).unwrap();

        assert!(record.added_at >= before);
        assert_eq!(record.checked_at, record.added_at);
        assert_eq!(record.size_bytes, 3);
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn analyze_existing_preserves_added_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("a.txt"));
        fs::write(path.to_native(), "abc").unwrap();
        let original = FsAnalyzer.analyze_new(&path).unwrap();

        fs::write(path.to_native(), "abcdef").unwrap();
        let revised = FsAnalyzer.analyze_existing(&original).unwrap();

        assert_eq!(revised.added_at, original.added_at);
        assert!(revised.updated_at.is_some());
        assert_eq!(revised.size_bytes, 6);
        assert_ne!(revised.content_hash, original.content_hash);
    }

    #[test]
    fn missing_file_maps_to_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("gone.txt"));

        let err = FsAnalyzer.analyze_new(&path).unwrap_err();
        assert!(matches!(err, Error::Unreadable { .. }));
        assert!(err.is_per_file());
    }
}
