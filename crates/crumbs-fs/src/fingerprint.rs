//! Content fingerprints: a SHA-256 hash plus the size and timestamps the
//! filesystem reported for the same bytes.

use std::fs::{self, File, Metadata};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::checksum::compute_reader_checksum;
use crate::{Error, Result};

/// Cheap on-disk signature used to decide whether a file needs rehashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Full fingerprint of a file's content at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub hash: String,
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Fingerprint {
    pub fn signature(&self) -> Signature {
        Signature {
            size: self.size,
            modified: self.modified,
        }
    }
}

/// Stat `path` without reading its content.
///
/// Every failure is reported as [`Error::Unreadable`]; a vanished file is a
/// per-file condition for callers, not a fatal one.
pub fn signature(path: &Path) -> Result<Signature> {
    let metadata = fs::metadata(path).map_err(|e| Error::unreadable(path, e))?;
    if !metadata.is_file() {
        return Err(Error::unreadable(path, "not a regular file"));
    }
    signature_of(path, &metadata)
}

/// Hash the full content of `path` and capture its metadata.
///
/// The file is opened read-only without any exclusive lock, so other readers
/// and writers are not blocked. Metadata is taken from the open handle before
/// reading and compared with a fresh stat afterwards: a file that disappears
/// or changes size or mtime while being hashed is reported as unreadable
/// rather than recorded with a hash that does not match its metadata.
pub fn fingerprint(path: &Path) -> Result<Fingerprint> {
    let mut file = File::open(path).map_err(|e| Error::unreadable(path, e))?;
    let before = file.metadata().map_err(|e| Error::unreadable(path, e))?;
    if !before.is_file() {
        return Err(Error::unreadable(path, "not a regular file"));
    }
    let expected = signature_of(path, &before)?;

    let (hash, bytes) = compute_reader_checksum(&mut file).map_err(|e| Error::unreadable(path, e))?;

    let after = match fs::metadata(path) {
        Ok(metadata) => signature_of(path, &metadata)?,
        Err(e) => return Err(Error::unreadable(path, format!("vanished while reading: {e}"))),
    };
    if after != expected || bytes != expected.size {
        return Err(Error::unreadable(path, "changed while reading"));
    }

    let created = before
        .created()
        .map(to_utc)
        .unwrap_or(expected.modified);

    Ok(Fingerprint {
        hash,
        size: expected.size,
        created,
        modified: expected.modified,
    })
}

fn signature_of(path: &Path, metadata: &Metadata) -> Result<Signature> {
    let modified = metadata.modified().map_err(|e| Error::unreadable(path, e))?;
    Ok(Signature {
        size: metadata.len(),
        modified: to_utc(modified),
    })
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}
